//! NetBeans module package (`.nbm`) types and inspection.
//!
//! An `.nbm` file is a zip archive whose `Info/info.xml` entry describes the
//! module it contains:
//!
//! ```text
//! <module codenamebase="org.esa.snap.core" distribution="..." ...>
//!   <description>...</description>
//!   <manifest OpenIDE-Module-Specification-Version="2.0.1" .../>
//!   <license name="GPL-3.0">...</license>      (optional)
//! </module>
//! ```
//!
//! # Type Overview
//!
//! - [`Package`]: identity of one archive (codename, specification version, path)
//! - [`ModuleEntry`]: the catalog-ready metadata record of one archive
//! - [`License`]: a named license text carried by a module
//! - [`SpecVersion`]: dotted version with numeric component ordering

mod core;
mod error;
mod inspect;
mod metadata;
mod version;

pub use core::Package;
pub use error::{PackageError, PackageResult};
pub use inspect::{
    extract_codename, extract_metadata, extract_version, inspect, inspect_directory, is_nbm,
    list_nbms, INFO_ENTRY, NBM_EXTENSION,
};
pub use metadata::{License, ModuleEntry, DOWNLOAD_SIZE_ATTRIBUTE};
pub use version::{SpecVersion, VersionParseError};
