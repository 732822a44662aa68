//! Catalog schema.
//!
//! The Autoupdate Catalog 2.5 DTD is compiled into the binary and parsed into
//! a [`Dtd`]: element content models become anchored regular expressions over
//! the sequence of child element names, and attribute lists keep their types
//! and defaults. Only the declaration forms used by catalog DTDs are
//! supported (`ELEMENT` and `ATTLIST`; entities and notations are not).

use std::collections::HashMap;

use regex::Regex;

use super::error::{CatalogError, CatalogResult};
use crate::xml::{Document, Element, Node};

/// The Autoupdate Catalog 2.5 DTD.
pub const CATALOG_DTD: &str = include_str!("autoupdate-catalog-2_5.dtd");

/// Root element of a catalog document.
pub const CATALOG_ROOT: &str = "module_updates";

/// Public identifier declared in every catalog's DOCTYPE.
pub const CATALOG_PUBLIC_ID: &str = "-//NetBeans//DTD Autoupdate Catalog 2.5//EN";

/// System identifier declared in every catalog's DOCTYPE.
pub const CATALOG_SYSTEM_ID: &str = "http://www.netbeans.org/dtds/autoupdate-catalog-2_5.dtd";

/// DOCTYPE body for catalog documents.
pub fn catalog_doctype() -> String {
    format!(
        "{} PUBLIC \"{}\" \"{}\"",
        CATALOG_ROOT, CATALOG_PUBLIC_ID, CATALOG_SYSTEM_ID
    )
}

#[derive(Debug)]
enum ContentModel {
    Empty,
    Any,
    /// `(#PCDATA | a | b)*`: text plus the listed elements.
    Mixed(Vec<String>),
    Children {
        source: String,
        pattern: Regex,
    },
}

#[derive(Debug)]
enum AttributeType {
    CData,
    Enumerated(Vec<String>),
    Tokenized(String),
}

#[derive(Debug)]
enum AttributeDefault {
    Required,
    Implied,
    Fixed(String),
    Value(String),
}

#[derive(Debug)]
struct AttributeDecl {
    name: String,
    kind: AttributeType,
    default: AttributeDefault,
}

/// A parsed DTD able to validate element trees.
#[derive(Debug)]
pub struct Dtd {
    elements: HashMap<String, ContentModel>,
    attributes: HashMap<String, Vec<AttributeDecl>>,
}

fn schema_error(message: impl Into<String>) -> CatalogError {
    CatalogError::Schema(message.into())
}

impl Dtd {
    /// Parse DTD text.
    pub fn parse(text: &str) -> CatalogResult<Self> {
        let comments = Regex::new(r"(?s)<!--.*?-->").map_err(|e| schema_error(e.to_string()))?;
        let declaration = Regex::new(r"(?s)<!(ELEMENT|ATTLIST)\s+(\S+)\s+(.*?)>")
            .map_err(|e| schema_error(e.to_string()))?;

        let stripped = comments.replace_all(text, "");
        let mut dtd = Dtd {
            elements: HashMap::new(),
            attributes: HashMap::new(),
        };

        for caps in declaration.captures_iter(&stripped) {
            let name = caps[2].to_string();
            let body = caps[3].trim();
            if &caps[1] == "ELEMENT" {
                let model = parse_content_model(body)?;
                dtd.elements.insert(name, model);
            } else {
                let decls = parse_attlist(&name, body)?;
                dtd.attributes.entry(name).or_default().extend(decls);
            }
        }

        if dtd.elements.is_empty() {
            return Err(schema_error("no element declarations found"));
        }
        Ok(dtd)
    }

    /// The compiled-in catalog DTD.
    pub fn catalog() -> CatalogResult<Self> {
        Self::parse(CATALOG_DTD)
    }

    /// Check whether an element is declared.
    pub fn declares(&self, element: &str) -> bool {
        self.elements.contains_key(element)
    }

    /// Validate an element tree, returning every violation found.
    pub fn validate(&self, root: &Element) -> Vec<String> {
        let mut violations = Vec::new();
        self.validate_element(root, root.name(), &mut violations);
        violations
    }

    fn validate_element(&self, element: &Element, location: &str, violations: &mut Vec<String>) {
        let Some(model) = self.elements.get(element.name()) else {
            violations.push(format!(
                "{}: element <{}> is not declared",
                location,
                element.name()
            ));
            return;
        };

        self.validate_attributes(element, location, violations);

        match model {
            ContentModel::Empty => {
                if !element.children().is_empty() {
                    violations.push(format!("{}: <{}> must be empty", location, element.name()));
                }
            }
            ContentModel::Any => {}
            ContentModel::Mixed(allowed) => {
                for child in element.child_elements() {
                    if !allowed.iter().any(|name| name == child.name()) {
                        violations.push(format!(
                            "{}: element <{}> is not allowed in <{}>",
                            location,
                            child.name(),
                            element.name()
                        ));
                    }
                }
            }
            ContentModel::Children { source, pattern } => {
                let has_text = element
                    .children()
                    .iter()
                    .any(|node| matches!(node, Node::Text(text) if !text.trim().is_empty()));
                if has_text {
                    violations.push(format!(
                        "{}: character data is not allowed in <{}>",
                        location,
                        element.name()
                    ));
                }

                let sequence: String = element
                    .child_elements()
                    .map(|child| format!("<{}>", child.name()))
                    .collect();
                if !pattern.is_match(&sequence) {
                    violations.push(format!(
                        "{}: content of <{}> does not match {}",
                        location,
                        element.name(),
                        source
                    ));
                }
            }
        }

        for child in element.child_elements() {
            self.validate_element(child, &child_location(location, child), violations);
        }
    }

    fn validate_attributes(&self, element: &Element, location: &str, violations: &mut Vec<String>) {
        let declared = self
            .attributes
            .get(element.name())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for (key, value) in element.attributes() {
            let Some(decl) = declared.iter().find(|decl| decl.name == key) else {
                violations.push(format!(
                    "{}: attribute '{}' is not declared for <{}>",
                    location,
                    key,
                    element.name()
                ));
                continue;
            };

            match &decl.kind {
                AttributeType::Enumerated(values) if !values.iter().any(|v| v == value) => {
                    violations.push(format!(
                        "{}: attribute {}=\"{}\" must be one of {}",
                        location,
                        key,
                        value,
                        values.join("|")
                    ));
                }
                AttributeType::Tokenized(kind) if value.trim().is_empty() => {
                    violations.push(format!(
                        "{}: attribute '{}' of type {} must not be empty",
                        location, key, kind
                    ));
                }
                _ => {}
            }

            if let AttributeDefault::Fixed(fixed) = &decl.default {
                if value != fixed {
                    violations.push(format!(
                        "{}: attribute '{}' must have the fixed value \"{}\"",
                        location, key, fixed
                    ));
                }
            }
        }

        for decl in declared {
            if matches!(decl.default, AttributeDefault::Required) && element.attribute(&decl.name).is_none() {
                violations.push(format!(
                    "{}: required attribute '{}' is missing on <{}>",
                    location,
                    decl.name,
                    element.name()
                ));
            }
        }
    }
}

fn child_location(parent: &str, child: &Element) -> String {
    match child
        .attribute("codenamebase")
        .or_else(|| child.attribute("name"))
    {
        Some(id) => format!("{}/{}[{}]", parent, child.name(), id),
        None => format!("{}/{}", parent, child.name()),
    }
}

/// Validate a parsed catalog: DOCTYPE, root element and DTD conformance.
pub fn validate_catalog_document(document: &Document) -> CatalogResult<()> {
    let dtd = Dtd::catalog()?;
    let mut violations = Vec::new();

    match &document.doctype {
        Some(doctype) if doctype.contains(CATALOG_PUBLIC_ID) => {}
        Some(doctype) => violations.push(format!(
            "DOCTYPE '{}' does not reference {}",
            doctype, CATALOG_PUBLIC_ID
        )),
        None => violations.push("document has no DOCTYPE declaration".to_string()),
    }

    if document.root.name() != CATALOG_ROOT {
        violations.push(format!(
            "root element is <{}>, expected <{}>",
            document.root.name(),
            CATALOG_ROOT
        ));
    }

    violations.extend(dtd.validate(&document.root));

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::CatalogValidationFailed(violations))
    }
}

fn parse_content_model(body: &str) -> CatalogResult<ContentModel> {
    match body {
        "EMPTY" => return Ok(ContentModel::Empty),
        "ANY" => return Ok(ContentModel::Any),
        _ => {}
    }

    if body.contains("#PCDATA") {
        let names = body
            .trim_end_matches('*')
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split('|')
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != "#PCDATA")
            .map(str::to_string)
            .collect();
        return Ok(ContentModel::Mixed(names));
    }

    let tokens = tokenize_model(body)?;
    let mut pos = 0;
    let expression = parse_particle(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(schema_error(format!("trailing tokens in content model {}", body)));
    }

    let pattern = Regex::new(&format!("^{}$", expression)).map_err(|e| schema_error(e.to_string()))?;
    Ok(ContentModel::Children {
        source: body.split_whitespace().collect::<Vec<_>>().join(" "),
        pattern,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Comma,
    Pipe,
    Occurrence(char),
    Name(String),
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn tokenize_model(body: &str) -> CatalogResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '(' => Token::Open,
            ')' => Token::Close,
            ',' => Token::Comma,
            '|' => Token::Pipe,
            '?' | '*' | '+' => Token::Occurrence(c),
            c if is_name_char(c) => {
                let mut name = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_name_char(next) {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                Token::Name(name)
            }
            other => {
                return Err(schema_error(format!(
                    "unexpected '{}' in content model {}",
                    other, body
                )))
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn parse_particle(tokens: &[Token], pos: &mut usize) -> CatalogResult<String> {
    let base = match tokens.get(*pos) {
        Some(Token::Open) => {
            *pos += 1;
            parse_group(tokens, pos)?
        }
        Some(Token::Name(name)) => {
            *pos += 1;
            format!("(?:<{}>)", regex::escape(name))
        }
        other => return Err(schema_error(format!("unexpected token {:?}", other))),
    };

    match tokens.get(*pos) {
        Some(Token::Occurrence(occurrence)) => {
            *pos += 1;
            Ok(format!("{}{}", base, occurrence))
        }
        _ => Ok(base),
    }
}

fn parse_group(tokens: &[Token], pos: &mut usize) -> CatalogResult<String> {
    let mut items = vec![parse_particle(tokens, pos)?];
    let mut separator: Option<Token> = None;

    loop {
        match tokens.get(*pos) {
            Some(Token::Close) => {
                *pos += 1;
                break;
            }
            Some(sep @ (Token::Comma | Token::Pipe)) => {
                if separator.as_ref().is_some_and(|previous| previous != sep) {
                    return Err(schema_error("mixed ',' and '|' in one group"));
                }
                separator = Some(sep.clone());
                *pos += 1;
                items.push(parse_particle(tokens, pos)?);
            }
            other => return Err(schema_error(format!("unexpected token {:?}", other))),
        }
    }

    let joined = match separator {
        Some(Token::Pipe) => items.join("|"),
        _ => items.concat(),
    };
    Ok(format!("(?:{})", joined))
}

fn unquote(token: &str) -> String {
    token.trim_matches(|c| c == '"' || c == '\'').to_string()
}

fn parse_attlist(element: &str, body: &str) -> CatalogResult<Vec<AttributeDecl>> {
    let token = Regex::new(r#"\([^)]*\)|"[^"]*"|'[^']*'|\S+"#).map_err(|e| schema_error(e.to_string()))?;
    let tokens: Vec<&str> = token.find_iter(body).map(|m| m.as_str()).collect();

    let mut decls = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let (Some(name), Some(kind), Some(default)) = (tokens.get(i), tokens.get(i + 1), tokens.get(i + 2)) else {
            return Err(schema_error(format!("incomplete ATTLIST for <{}>", element)));
        };
        i += 3;

        let kind = if kind.starts_with('(') {
            AttributeType::Enumerated(
                kind.trim_start_matches('(')
                    .trim_end_matches(')')
                    .split('|')
                    .map(|value| value.trim().to_string())
                    .collect(),
            )
        } else if *kind == "CDATA" {
            AttributeType::CData
        } else {
            AttributeType::Tokenized(kind.to_string())
        };

        let default = match *default {
            "#REQUIRED" => AttributeDefault::Required,
            "#IMPLIED" => AttributeDefault::Implied,
            "#FIXED" => {
                let value = tokens.get(i).ok_or_else(|| {
                    schema_error(format!("#FIXED without value for <{}> {}", element, name))
                })?;
                i += 1;
                AttributeDefault::Fixed(unquote(value))
            }
            literal => AttributeDefault::Value(unquote(literal)),
        };

        decls.push(AttributeDecl {
            name: name.to_string(),
            kind,
            default,
        });
    }

    Ok(decls)
}
