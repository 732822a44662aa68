//! Content summary of a catalog, for reporting and comparison.

use std::collections::{BTreeMap, BTreeSet};

use super::builder::Catalog;
use super::error::CatalogResult;
use crate::xml::{Document, Element};

/// What a catalog lists, independent of formatting and element order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub timestamp: Option<String>,
    pub notification: Option<String>,
    /// Codename to specification version.
    pub modules: BTreeMap<String, String>,
    pub licenses: BTreeSet<String>,
}

impl CatalogSummary {
    pub fn from_xml(text: &str) -> CatalogResult<Self> {
        let document = Document::parse(text)?;
        Ok(Self::from_element(&document.root))
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::from_element(&catalog.to_element())
    }

    /// Summarize a `module_updates` element, descending into module groups.
    pub fn from_element(root: &Element) -> Self {
        let mut summary = Self {
            timestamp: root.attribute("timestamp").map(str::to_string),
            ..Self::default()
        };
        summary.collect(root);
        summary
    }

    fn collect(&mut self, parent: &Element) {
        for child in parent.child_elements() {
            match child.name() {
                "notification" => self.notification = Some(child.text()),
                "module_group" => self.collect(child),
                "module" => {
                    if let Some(codename) = child.attribute("codenamebase") {
                        self.modules.insert(codename.to_string(), module_version(child));
                    }
                }
                "license" => {
                    if let Some(name) = child.attribute("name") {
                        self.licenses.insert(name.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    /// Same modules and licenses, ignoring timestamp and notification.
    pub fn same_content(&self, other: &Self) -> bool {
        self.modules == other.modules && self.licenses == other.licenses
    }
}

fn module_version(module: &Element) -> String {
    module
        .find_child("manifest")
        .and_then(|m| m.attribute("OpenIDE-Module-Specification-Version"))
        .or_else(|| {
            module
                .find_child("l10n")
                .and_then(|l| l.attribute("module_spec_version"))
        })
        .unwrap_or_default()
        .to_string()
}
