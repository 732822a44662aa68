//! Catalog-ready module metadata.
//!
//! A [`ModuleEntry`] is built from the parsed `Info/info.xml` root of a
//! package: the same `module` element without its `license` child, with the
//! archive's size on disk recorded in `downloadsize`. The license, if any,
//! is kept next to it so the catalog can deduplicate licenses by name.

use std::path::{Path, PathBuf};

use super::error::{PackageError, PackageResult};
use super::inspect::{CODENAME_ATTRIBUTE, MANIFEST_ELEMENT, SPEC_VERSION_ATTRIBUTE};
use crate::xml::Element;

/// Attribute carrying the archive size in bytes.
pub const DOWNLOAD_SIZE_ATTRIBUTE: &str = "downloadsize";

pub(crate) const LICENSE_ELEMENT: &str = "license";

const LICENSE_NAME_ATTRIBUTE: &str = "name";

/// A named license text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    name: String,
    text: String,
}

impl License {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// License name, the deduplication key.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Read a license from a `<license name="...">` element.
    pub fn from_element(element: &Element) -> Option<Self> {
        element
            .attribute(LICENSE_NAME_ATTRIBUTE)
            .map(|name| Self::new(name, element.text()))
    }

    /// Render as a `<license name="...">text</license>` element.
    pub fn to_element(&self) -> Element {
        let element = Element::new(LICENSE_ELEMENT).with_attribute(LICENSE_NAME_ATTRIBUTE, &self.name);
        if self.text.is_empty() {
            element
        } else {
            element.with_text(&self.text)
        }
    }
}

/// Metadata record for one package, as it appears in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    codename: String,
    module: Element,
    license: Option<License>,
    path: PathBuf,
}

impl ModuleEntry {
    /// Build an entry from a parsed `info.xml` root.
    ///
    /// The input element is left untouched; the entry holds a copy without
    /// `license` children and with `downloadsize` set to `download_size`.
    pub fn from_info(info: &Element, download_size: u64, path: impl Into<PathBuf>) -> PackageResult<Self> {
        let path = path.into();

        let codename = info
            .attribute(CODENAME_ATTRIBUTE)
            .map(str::trim)
            .filter(|codename| !codename.is_empty())
            .ok_or_else(|| PackageError::malformed(&path, "module has no codenamebase"))?
            .to_string();

        let license = match info.find_child(LICENSE_ELEMENT) {
            Some(element) => Some(License::from_element(element).ok_or_else(|| {
                PackageError::malformed(&path, "license element has no name")
            })?),
            None => None,
        };

        let module = info
            .without_children_named(LICENSE_ELEMENT)
            .with_attribute(DOWNLOAD_SIZE_ATTRIBUTE, download_size.to_string());

        Ok(Self {
            codename,
            module,
            license,
            path,
        })
    }

    pub fn codename(&self) -> &str {
        &self.codename
    }

    /// The `module` element to place in the catalog.
    pub fn module(&self) -> &Element {
        &self.module
    }

    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Archive size recorded in the entry.
    pub fn download_size(&self) -> Option<u64> {
        self.module
            .attribute(DOWNLOAD_SIZE_ATTRIBUTE)
            .and_then(|size| size.parse().ok())
    }

    /// Raw specification version from the manifest, if declared.
    pub fn specification_version(&self) -> Option<&str> {
        self.module
            .find_child(MANIFEST_ELEMENT)
            .and_then(|manifest| manifest.attribute(SPEC_VERSION_ATTRIBUTE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    const INFO: &str = r#"<module codenamebase="org.example.a" distribution="a.nbm" downloadsize="0">
  <description>A</description>
  <manifest OpenIDE-Module="org.example.a" OpenIDE-Module-Name="A" OpenIDE-Module-Specification-Version="1.4"/>
  <license name="EPL-1.0">Eclipse Public License</license>
</module>"#;

    #[test]
    fn test_entry_strips_license_and_sets_size() {
        let info = Document::parse(INFO).unwrap().root;
        let entry = ModuleEntry::from_info(&info, 1234, "/repo/a.nbm").unwrap();

        assert_eq!(entry.codename(), "org.example.a");
        assert_eq!(entry.download_size(), Some(1234));
        assert_eq!(entry.specification_version(), Some("1.4"));
        assert!(entry.module().find_child("license").is_none());
        assert_eq!(entry.license(), Some(&License::new("EPL-1.0", "Eclipse Public License")));

        // The parsed input is not modified.
        assert!(info.find_child("license").is_some());
        assert_eq!(info.attribute("downloadsize"), Some("0"));
    }

    #[test]
    fn test_codename_is_trimmed() {
        let info = Element::new("module").with_attribute("codenamebase", "  org.example.b \n");
        let entry = ModuleEntry::from_info(&info, 7, "b.nbm").unwrap();
        assert_eq!(entry.codename(), "org.example.b");
    }

    #[test]
    fn test_entry_without_license() {
        let info = Element::new("module").with_attribute("codenamebase", "b");
        let entry = ModuleEntry::from_info(&info, 7, "b.nbm").unwrap();
        assert!(entry.license().is_none());
        assert_eq!(entry.module().attribute("downloadsize"), Some("7"));
    }

    #[test]
    fn test_entry_requires_codename() {
        let info = Element::new("module");
        let result = ModuleEntry::from_info(&info, 7, "b.nbm");
        assert!(matches!(result, Err(PackageError::MalformedPackage { .. })));
    }

    #[test]
    fn test_unnamed_license_is_malformed() {
        let info = Element::new("module")
            .with_attribute("codenamebase", "b")
            .with_child(Element::new("license").with_text("text"));
        let result = ModuleEntry::from_info(&info, 7, "b.nbm");
        assert!(matches!(result, Err(PackageError::MalformedPackage { .. })));
    }

    #[test]
    fn test_license_element_round_trip() {
        let license = License::new("GPL-3.0", "GNU GPL");
        let element = license.to_element();
        assert_eq!(element.name(), "license");
        assert_eq!(License::from_element(&element), Some(license));
    }
}
