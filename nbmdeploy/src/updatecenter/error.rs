//! Error types for update-center tree operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for update-center operations.
pub type UpdateCenterResult<T> = Result<T, UpdateCenterError>;

/// Errors raised while manipulating the update-center tree.
#[derive(Debug, Error)]
pub enum UpdateCenterError {
    /// The release name is not of the form `MAJOR.MINOR`.
    #[error("release version does not match pattern ([0-9]+.[0-9]+): {0}")]
    InvalidRelease(String),

    /// The repository is not one of the configured repositories.
    #[error("unknown repository '{repo}' (expected one of: {known})")]
    UnknownRepository { repo: String, known: String },

    /// The release link does not resolve to a snapshot.
    #[error("release {release} has no current snapshot at {}", path.display())]
    NoCurrentSnapshot { release: String, path: PathBuf },

    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to remove a file.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to copy a file.
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to walk a snapshot tree.
    #[error("failed to walk {}: {source}", path.display())]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Failed to create or swap a symlink.
    #[error("failed to point {} at {}: {reason}", link.display(), target.display())]
    SymlinkFailed {
        link: PathBuf,
        target: PathBuf,
        reason: String,
    },
}
