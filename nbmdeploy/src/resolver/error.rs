//! Error types for supersession resolution.

use thiserror::Error;

use crate::package::SpecVersion;

/// Result type for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Reasons a batch of incoming packages is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// An incoming package is not strictly newer than an existing one.
    #[error(
        "you want to deploy {incoming} with specification version {incoming_version}, \
         but there is already {existing} with version {existing_version} in the repository"
    )]
    VersionConflict {
        codename: String,
        incoming: String,
        incoming_version: SpecVersion,
        existing: String,
        existing_version: SpecVersion,
    },

    /// Two incoming packages share a codename.
    #[error("{first} and {second} both provide module {codename}")]
    DuplicateCodename {
        codename: String,
        first: String,
        second: String,
    },

    /// An incoming file would overwrite a file of another module.
    #[error(
        "{file_name} ({incoming_codename}) would overwrite the file of {existing_codename}"
    )]
    FileNameCollision {
        file_name: String,
        incoming_codename: String,
        existing_codename: String,
    },
}
