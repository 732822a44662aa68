//! Owned XML element tree.
//!
//! Package metadata and catalogs are small documents, so they are read into
//! a plain tree of [`Element`] values with `quick-xml` and written back with
//! its indenting writer. Elements are treated as values: the `with_*` and
//! `without_*` helpers return new elements instead of editing a parsed tree.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Result type for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;

/// Errors raised while reading or writing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The text is not well-formed XML.
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// A closing tag did not match the open element.
    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    /// The document ended with an element still open.
    #[error("unclosed element <{0}>")]
    Unclosed(String),

    /// The document has no root element.
    #[error("document has no root element")]
    NoRoot,

    /// Markup or text found after the root element.
    #[error("content found after the root element")]
    TrailingContent,

    /// Serialization failed.
    #[error("failed to serialize XML: {0}")]
    Write(String),
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element (tag) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All child nodes in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given name.
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Return this element with an attribute set, replacing any previous value.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    /// Return this element with a child element appended.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Return this element with a text node appended.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Copy of this element without direct children of the given name.
    pub fn without_children_named(&self, name: &str) -> Self {
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: self
                .children
                .iter()
                .filter(|node| !matches!(node, Node::Element(e) if e.name == name))
                .cloned()
                .collect(),
        }
    }
}

/// A parsed document: optional DOCTYPE plus the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// DOCTYPE declaration body, e.g. `module PUBLIC "..." "..."`.
    pub doctype: Option<String>,
    pub root: Element,
}

impl Document {
    /// Parse a document from text.
    ///
    /// Comments and processing instructions are skipped. Text is kept
    /// verbatim, except whitespace-only text inside an element that also has
    /// child elements, which is indentation.
    pub fn parse(text: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut doctype = None;

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Syntax {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => stack.push(open_element(&start, &reader)?),
                Event::Empty(start) => {
                    let element = open_element(&start, &reader)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(end) => {
                    let name = decode_name(end.name().as_ref());
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| XmlError::UnexpectedClose(name.clone()))?;
                    if element.name != name {
                        return Err(XmlError::UnexpectedClose(name));
                    }
                    drop_indentation(&mut element);
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| XmlError::Syntax {
                        position: reader.buffer_position() as u64,
                        message: e.to_string(),
                    })?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    push_text(&mut stack, &String::from_utf8_lossy(&data))?;
                }
                Event::DocType(body) => {
                    doctype = Some(String::from_utf8_lossy(&body).trim().to_string());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }

        root.map(|root| Document { doctype, root })
            .ok_or(XmlError::NoRoot)
    }
}

fn decode_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn open_element(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> XmlResult<Element> {
    let mut element = Element::new(decode_name(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::Syntax {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::Syntax {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?
            .into_owned();
        element
            .attributes
            .push((decode_name(attribute.key.as_ref()), value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::TrailingContent),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text.to_string()));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::TrailingContent),
    }
}

fn drop_indentation(element: &mut Element) {
    if element.child_elements().next().is_some() {
        element
            .children
            .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
    }
}

/// Serialize a document with an XML declaration and optional DOCTYPE.
///
/// The body is indented by two spaces; text content stays inline with its
/// element.
pub fn write_document(root: &Element, doctype: Option<&str>) -> XmlResult<String> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    if let Some(doctype) = doctype {
        buffer.extend_from_slice(format!("<!DOCTYPE {}>\n", doctype).as_bytes());
    }

    let mut writer = Writer::new_with_indent(buffer, b' ', 2);
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| XmlError::Write(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> XmlResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| XmlError::Write(e.to_string()))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}
