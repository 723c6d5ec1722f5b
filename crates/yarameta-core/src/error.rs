//! Error types for yarameta-core

/// Result type for yarameta-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run
///
/// Problems confined to a single rule file (parse failures, missing
/// baselines) are not errors; they end up in the
/// [`RunReport`](crate::RunReport).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A settings value that cannot be used
    #[error("Invalid setting `{key}`: {message}")]
    InvalidSetting { key: String, message: String },

    /// An ignored commit prefix that names more than one commit
    #[error("Ignored hash `{prefix}` is ambiguous: it matches {matches} commits")]
    AmbiguousCommitPrefix { prefix: String, matches: usize },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from yarameta-fs
    #[error(transparent)]
    Fs(#[from] yarameta_fs::Error),

    /// Git error from yarameta-git
    #[error(transparent)]
    Git(#[from] yarameta_git::Error),
}
