//! Core package identity type.
//!
//! The [`Package`] struct is what the resolver works with: the codename that
//! identifies a module across versions, the specification version that
//! orders releases of it, and the archive it was read from.

use std::fmt;
use std::path::{Path, PathBuf};

use super::version::SpecVersion;

/// Identity of one `.nbm` archive.
///
/// # Example
///
/// ```
/// use nbmdeploy::package::Package;
///
/// let package = Package::new(
///     "org.esa.snap.core",
///     "2.0".parse().unwrap(),
///     "/uc/8.0/snap/snap-core.nbm",
/// );
///
/// assert_eq!(package.file_name(), "snap-core.nbm");
/// assert_eq!(package.to_string(), "snap-core.nbm (org.esa.snap.core 2.0)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Stable module identity (`codenamebase`), independent of version.
    pub codename: String,

    /// Specification version declared in the manifest.
    pub version: SpecVersion,

    /// Location of the archive on disk.
    pub path: PathBuf,
}

impl Package {
    /// Create a new package identity.
    pub fn new(codename: impl Into<String>, version: SpecVersion, path: impl Into<PathBuf>) -> Self {
        Self {
            codename: codename.into(),
            version,
            path: path.into(),
        }
    }

    /// File name of the archive, e.g. `snap-core.nbm`.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.file_name(), self.codename, self.version)
    }
}
