//! Normalized path handling for matching on-disk files against git paths

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Git reports repository paths with forward slashes on every platform, so
/// candidate files are converted into this form before they are compared
/// against commit deltas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Backslashes become forward slashes and a leading `./` is dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        let trimmed = normalized.strip_prefix("./").unwrap_or(&normalized);
        Self {
            inner: trimmed.to_string(),
        }
    }

    /// Resolve `path` against `root` and return it relative to `root`.
    ///
    /// Both sides are canonicalized first so that symlinked checkouts and
    /// `..` segments do not defeat the prefix check.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if either path cannot be canonicalized and
    /// [`Error::OutsideRoot`] if `path` does not live under `root`.
    pub fn relative_to(path: &Path, root: &Path) -> Result<Self> {
        let canonical_root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
        let canonical_path = dunce::canonicalize(path).map_err(|e| Error::io(path, e))?;

        canonical_path
            .strip_prefix(&canonical_root)
            .map(Self::new)
            .map_err(|_| Error::OutsideRoot {
                path: canonical_path.clone(),
                root: canonical_root.clone(),
            })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Check whether the extension is one of `extensions` (without dots).
    pub fn has_extension(&self, extensions: &[&str]) -> bool {
        self.extension()
            .is_some_and(|ext| extensions.contains(&ext))
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
