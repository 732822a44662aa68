//! Error types for catalog generation.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::package::PackageError;
use crate::xml::XmlError;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while building, validating or publishing a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// A package in the release directory could not be read.
    Package(PackageError),

    /// The catalog text could not be parsed or serialized.
    Xml(XmlError),

    /// The compiled-in DTD could not be parsed.
    Schema(String),

    /// The catalog does not conform to the DTD.
    CatalogValidationFailed(Vec<String>),

    /// Failed to write a catalog file.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to read a catalog file.
    ReadFailed { path: PathBuf, source: io::Error },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Package(e) => write!(f, "{}", e),
            CatalogError::Xml(e) => write!(f, "{}", e),
            CatalogError::Schema(msg) => write!(f, "invalid catalog DTD: {}", msg),
            CatalogError::CatalogValidationFailed(violations) => {
                write!(f, "catalog failed DTD validation")?;
                for violation in violations {
                    write!(f, "\n  - {}", violation)?;
                }
                Ok(())
            }
            CatalogError::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            CatalogError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Package(e) => Some(e),
            CatalogError::Xml(e) => Some(e),
            CatalogError::WriteFailed { source, .. } | CatalogError::ReadFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

impl From<PackageError> for CatalogError {
    fn from(e: PackageError) -> Self {
        CatalogError::Package(e)
    }
}

impl From<XmlError> for CatalogError {
    fn from(e: XmlError) -> Self {
        CatalogError::Xml(e)
    }
}
