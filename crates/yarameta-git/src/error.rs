//! Error types for yarameta-git

use std::path::PathBuf;

/// Result type for yarameta-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in yarameta-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] yarameta_fs::Error),

    #[error("Not a git repository (or any parent): {path}")]
    NotARepository { path: PathBuf },

    #[error("Repository at {path} has no working tree")]
    BareRepository { path: PathBuf },

    #[error("HEAD does not point to a commit yet")]
    UnbornHead,

    #[error("Revision '{rev}' could not be resolved to a commit")]
    RevisionNotFound { rev: String },

    #[error("Commit '{id}' not found")]
    CommitNotFound { id: String },
}
