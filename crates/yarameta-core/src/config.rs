//! Run settings: tag names, commit-hash storage and ignored commits
//!
//! Settings come from three places, later ones winning:
//! 1. Built-in defaults
//! 2. A settings file (`.yara-metadata.toml` at the repository root, or an
//!    explicit path in any format [`ConfigStore`] understands)
//! 3. Command-line overrides
//!
//! Ignored commit lists are merged rather than replaced.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use yarameta_fs::ConfigStore;

use crate::{Error, Result};

/// File name looked up at the repository root when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = ".yara-metadata.toml";

/// Shortest accepted abbreviation of an ignored commit id.
pub const MIN_HASH_PREFIX: usize = 7;

fn default_created_tag() -> String {
    "created_on".to_string()
}

fn default_modified_tag() -> String {
    "last_modified".to_string()
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Meta key holding the creation date
    #[serde(default = "default_created_tag")]
    pub created_tag: String,

    /// Meta key holding the last-modified date
    #[serde(default = "default_modified_tag")]
    pub modified_tag: String,

    /// Whether to maintain a `commit_hash` entry
    #[serde(default)]
    pub store_commit_hash: bool,

    /// Commits whose changes never count toward provenance
    #[serde(default)]
    pub ignored_hashes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            created_tag: default_created_tag(),
            modified_tag: default_modified_tag(),
            store_commit_hash: false,
            ignored_hashes: Vec::new(),
        }
    }
}

/// Values given on the command line. `None` / `false` / empty leave the
/// underlying setting alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub created_tag: Option<String>,
    pub modified_tag: Option<String>,
    pub store_commit_hash: bool,
    pub ignored_hashes: Vec<String>,
}

impl Settings {
    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Self = ConfigStore::new().load(path)?;
        debug!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    /// Resolve settings for a repository rooted at `root`.
    ///
    /// An explicit `path` must exist. Without one, the default settings file
    /// is used when present and built-in defaults otherwise.
    pub fn resolve(root: &Path, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path: PathBuf = root.join(DEFAULT_SETTINGS_FILE);
                if default_path.is_file() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply command-line overrides on top of these settings.
    pub fn merge(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(tag) = overrides.created_tag {
            self.created_tag = tag;
        }
        if let Some(tag) = overrides.modified_tag {
            self.modified_tag = tag;
        }
        self.store_commit_hash |= overrides.store_commit_hash;

        let from_file = std::mem::take(&mut self.ignored_hashes);
        for hash in from_file.into_iter().chain(overrides.ignored_hashes) {
            let hash = hash.trim().to_ascii_lowercase();
            if !hash.is_empty() && !self.ignored_hashes.contains(&hash) {
                self.ignored_hashes.push(hash);
            }
        }
        self
    }

    /// Check that the settings can be applied to rule text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] if a tag is not a valid YARA
    /// identifier or both tags are equal. Ignored hashes must be hexadecimal
    /// and at least [`MIN_HASH_PREFIX`] characters long.
    pub fn validate(&self) -> Result<()> {
        for (key, tag) in [
            ("created_tag", &self.created_tag),
            ("modified_tag", &self.modified_tag),
        ] {
            if !is_identifier(tag) {
                return Err(Error::InvalidSetting {
                    key: key.to_string(),
                    message: format!("`{tag}` is not a valid metadata identifier"),
                });
            }
        }

        if self.created_tag == self.modified_tag {
            return Err(Error::InvalidSetting {
                key: "modified_tag".to_string(),
                message: format!("must differ from created_tag `{}`", self.created_tag),
            });
        }

        if let Some(hash) = self
            .ignored_hashes
            .iter()
            .find(|h| h.len() < MIN_HASH_PREFIX || !h.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(Error::InvalidSetting {
                key: "ignored_hashes".to_string(),
                message: format!(
                    "`{hash}` is not a commit hash or a prefix of at least {MIN_HASH_PREFIX} characters"
                ),
            });
        }

        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
