//! Update-center catalog.
//!
//! A catalog (`updates.xml`) lists the metadata of every package in a release
//! directory, followed by the distinct licenses those packages reference. It
//! is published together with a gzip copy (`updates.xml.gz`) only after the
//! serialized document has passed validation against the Autoupdate Catalog
//! 2.5 DTD.
//!
//! # Example
//!
//! ```ignore
//! use nbmdeploy::catalog::{generate_catalog, CatalogTimestamp};
//!
//! let published = generate_catalog(release_dir, None, &CatalogTimestamp::now())?;
//! println!("{} modules", published.module_count);
//! ```

mod builder;
mod error;
mod publish;
mod schema;
mod summary;

pub use builder::{
    build, scan_directory, Catalog, CatalogTimestamp, CatalogWarning, Notification, TIMESTAMP_FORMAT,
};
pub use error::{CatalogError, CatalogResult};
pub use publish::{
    generate_catalog, publish_catalog, render_catalog, validate_catalog_file, validate_catalog_text,
    PublishedCatalog, CATALOG_FILENAME, COMPRESSED_CATALOG_FILENAME,
};
pub use schema::{
    catalog_doctype, validate_catalog_document, Dtd, CATALOG_DTD, CATALOG_PUBLIC_ID, CATALOG_ROOT,
    CATALOG_SYSTEM_ID,
};
pub use summary::CatalogSummary;
