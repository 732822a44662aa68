//! Error types for package inspection.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Errors that can occur while reading `.nbm` packages.
#[derive(Debug)]
pub enum PackageError {
    /// Failed to read a file or directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// The archive is unreadable or its metadata entry is missing or invalid.
    MalformedPackage { path: PathBuf, reason: String },

    /// The metadata has no specification version.
    MissingVersionInfo(PathBuf),

    /// The specification version could not be parsed.
    InvalidVersion { path: PathBuf, version: String },
}

impl PackageError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PackageError::MalformedPackage {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            PackageError::MalformedPackage { path, reason } => {
                write!(f, "malformed package {}: {}", path.display(), reason)
            }
            PackageError::MissingVersionInfo(path) => {
                write!(
                    f,
                    "unable to get OpenIDE-Module-Specification-Version from {}",
                    path.display()
                )
            }
            PackageError::InvalidVersion { path, version } => {
                write!(
                    f,
                    "invalid specification version '{}' in {}",
                    version,
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for PackageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackageError::ReadFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_malformed_display() {
        let err = PackageError::malformed("/repo/a.nbm", "missing Info/info.xml");
        let msg = err.to_string();
        assert!(msg.contains("/repo/a.nbm"));
        assert!(msg.contains("missing Info/info.xml"));
    }

    #[test]
    fn test_missing_version_display() {
        let err = PackageError::MissingVersionInfo(PathBuf::from("b.nbm"));
        assert!(err
            .to_string()
            .contains("OpenIDE-Module-Specification-Version"));
    }

    #[test]
    fn test_error_source() {
        let err = PackageError::ReadFailed {
            path: PathBuf::from("/x"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(PackageError::MissingVersionInfo(PathBuf::from("/x"))
            .source()
            .is_none());
    }
}
