//! Writing `updates.xml` and `updates.xml.gz`.
//!
//! The serialized text is validated against the catalog DTD before anything
//! touches the disk, so a rejected catalog leaves the previous files in place.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{error, info};

use super::builder::{build, scan_directory, Catalog, CatalogTimestamp, CatalogWarning, Notification};
use super::error::{CatalogError, CatalogResult};
use super::schema::validate_catalog_document;
use super::summary::CatalogSummary;
use crate::xml::Document;

/// File name of the plain catalog.
pub const CATALOG_FILENAME: &str = "updates.xml";

/// File name of the gzip-compressed catalog.
pub const COMPRESSED_CATALOG_FILENAME: &str = "updates.xml.gz";

/// Outcome of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishedCatalog {
    pub xml_path: PathBuf,
    pub gz_path: PathBuf,
    pub module_count: usize,
    pub license_count: usize,
    /// Size of the uncompressed catalog in bytes.
    pub size: u64,
    pub warnings: Vec<CatalogWarning>,
}

/// Serialize a catalog and validate the result.
pub fn render_catalog(catalog: &Catalog) -> CatalogResult<String> {
    let xml = catalog.to_xml()?;
    validate_catalog_text(&xml)?;
    Ok(xml)
}

/// Parse catalog text and check it against the DTD.
pub fn validate_catalog_text(text: &str) -> CatalogResult<()> {
    let document = Document::parse(text)?;
    validate_catalog_document(&document).inspect_err(|e| {
        if let CatalogError::CatalogValidationFailed(violations) = e {
            error!(violations = violations.len(), "Catalog failed DTD validation");
        }
    })
}

/// Validate a catalog and write both catalog files into `dir`.
pub fn publish_catalog(dir: &Path, catalog: &Catalog) -> CatalogResult<PublishedCatalog> {
    let xml = render_catalog(catalog)?;

    let xml_path = dir.join(CATALOG_FILENAME);
    fs::write(&xml_path, xml.as_bytes()).map_err(|source| CatalogError::WriteFailed {
        path: xml_path.clone(),
        source,
    })?;

    let gz_path = dir.join(COMPRESSED_CATALOG_FILENAME);
    write_gzip(&gz_path, xml.as_bytes())?;

    info!(
        path = %xml_path.display(),
        modules = catalog.modules().len(),
        licenses = catalog.licenses().len(),
        "Published catalog"
    );

    Ok(PublishedCatalog {
        xml_path,
        gz_path,
        module_count: catalog.modules().len(),
        license_count: catalog.licenses().len(),
        size: xml.len() as u64,
        warnings: catalog.warnings().to_vec(),
    })
}

fn write_gzip(path: &Path, bytes: &[u8]) -> CatalogResult<()> {
    let write_failed = |source| CatalogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_failed)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(bytes).map_err(write_failed)?;
    encoder.finish().map_err(write_failed)?;
    Ok(())
}

/// Scan `dir`, build its catalog and publish it there.
pub fn generate_catalog(
    dir: &Path,
    notification: Option<&Notification>,
    timestamp: &CatalogTimestamp,
) -> CatalogResult<PublishedCatalog> {
    let entries = scan_directory(dir)?;
    let catalog = build(&entries, notification, timestamp);
    publish_catalog(dir, &catalog)
}

/// Read and validate an existing catalog file.
pub fn validate_catalog_file(path: &Path) -> CatalogResult<CatalogSummary> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    validate_catalog_text(&text)?;
    CatalogSummary::from_xml(&text)
}
