//! Error type for deployment runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::package::PackageError;
use crate::resolver::ResolveError;
use crate::updatecenter::UpdateCenterError;

/// Result type for deployment runs.
pub type DeployResult<T> = Result<T, DeployError>;

/// Any failure that aborts a deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("{} is not a directory", .0.display())]
    InputNotDirectory(PathBuf),

    #[error("{} does not contain any nbm file", .0.display())]
    NoPackages(PathBuf),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    UpdateCenter(#[from] UpdateCenterError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::SpecVersion;

    #[test]
    fn test_conflict_message_passes_through() {
        let err: DeployError = ResolveError::VersionConflict {
            codename: "org.a".to_string(),
            incoming: "a.nbm".to_string(),
            incoming_version: "1.0".parse::<SpecVersion>().unwrap(),
            existing: "a-old.nbm".to_string(),
            existing_version: "1.0".parse::<SpecVersion>().unwrap(),
        }
        .into();
        assert!(err.to_string().contains("a-old.nbm"));
    }

    #[test]
    fn test_no_packages_message() {
        let err = DeployError::NoPackages(PathBuf::from("/tmp/in"));
        assert_eq!(err.to_string(), "/tmp/in does not contain any nbm file");
    }
}
