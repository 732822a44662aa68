//! Catalog assembly from module metadata.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, warn};

use super::error::CatalogResult;
use super::schema::{catalog_doctype, CATALOG_ROOT};
use crate::package::{extract_metadata, list_nbms, License, ModuleEntry};
use crate::xml::{write_document, Element};

/// Format of the catalog `timestamp` attribute: seconds first, year last.
pub const TIMESTAMP_FORMAT: &str = "%S/%M/%H/%d/%m/%Y";

/// The generation time recorded in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTimestamp(String);

impl CatalogTimestamp {
    /// The current local time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(datetime.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional message shown to users of the update center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    message: String,
    url: Option<String>,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            url: None,
        }
    }

    /// Attach a link to the notification.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn to_element(&self) -> Element {
        let element = Element::new("notification");
        let element = match &self.url {
            Some(url) => element.with_attribute("url", url.as_str()),
            None => element,
        };
        element.with_text(self.message.as_str())
    }
}

/// Non-fatal findings while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// The modules reference more than one license.
    MixedLicenses(Vec<String>),
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogWarning::MixedLicenses(names) => write!(
                f,
                "modules use {} different licenses: {}",
                names.len(),
                names.join(", ")
            ),
        }
    }
}

/// An assembled catalog, ready to be serialized.
#[derive(Debug, Clone)]
pub struct Catalog {
    timestamp: CatalogTimestamp,
    notification: Option<Notification>,
    modules: Vec<Element>,
    licenses: Vec<License>,
    warnings: Vec<CatalogWarning>,
}

impl Catalog {
    pub fn timestamp(&self) -> &CatalogTimestamp {
        &self.timestamp
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Module elements in catalog order.
    pub fn modules(&self) -> &[Element] {
        &self.modules
    }

    /// Distinct licenses in first-seen order.
    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    /// The `module_updates` element: notification, modules, then licenses.
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(CATALOG_ROOT).with_attribute("timestamp", self.timestamp.as_str());
        if let Some(notification) = &self.notification {
            root = root.with_child(notification.to_element());
        }
        for module in &self.modules {
            root = root.with_child(module.clone());
        }
        for license in &self.licenses {
            root = root.with_child(license.to_element());
        }
        root
    }

    /// Serialize with the XML prolog and catalog DOCTYPE.
    pub fn to_xml(&self) -> CatalogResult<String> {
        Ok(write_document(&self.to_element(), Some(&catalog_doctype()))?)
    }
}

/// Assemble a catalog from module metadata.
///
/// Licenses are deduplicated by name, keeping the first text seen. More than
/// one distinct license produces a [`CatalogWarning::MixedLicenses`].
pub fn build(
    entries: &[ModuleEntry],
    notification: Option<&Notification>,
    timestamp: &CatalogTimestamp,
) -> Catalog {
    let mut seen = HashSet::new();
    let mut licenses = Vec::new();
    for license in entries.iter().filter_map(ModuleEntry::license) {
        if seen.insert(license.name()) {
            licenses.push(license.clone());
        }
    }

    let mut warnings = Vec::new();
    if licenses.len() > 1 {
        let names: Vec<String> = licenses.iter().map(|l| l.name().to_string()).collect();
        warn!(count = names.len(), licenses = %names.join(", "), "Modules use more than one license");
        warnings.push(CatalogWarning::MixedLicenses(names));
    }

    debug!(modules = entries.len(), licenses = licenses.len(), "Built catalog");

    Catalog {
        timestamp: timestamp.clone(),
        notification: notification.cloned(),
        modules: entries.iter().map(|entry| entry.module().clone()).collect(),
        licenses,
        warnings,
    }
}

/// Read the metadata of every `.nbm` in a directory, sorted by file name.
pub fn scan_directory(dir: &Path) -> CatalogResult<Vec<ModuleEntry>> {
    let mut entries = Vec::new();
    for path in list_nbms(dir)? {
        entries.push(extract_metadata(&path)?);
    }
    Ok(entries)
}
