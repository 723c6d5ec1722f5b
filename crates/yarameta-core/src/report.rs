//! Outcome of a reconciliation run

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::writer::MetaChange;

/// Metadata changes made to one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleUpdate {
    pub rule: String,
    pub changes: Vec<MetaChange>,
}

/// A rule file whose metadata changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdate {
    pub path: PathBuf,
    pub rules: Vec<RuleUpdate>,
    /// Unified diff of the rewrite; only filled in on dry runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// A rule file that could not be parsed and was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub error: String,
    /// The metadata the file's rules would have received
    pub metadata: String,
}

/// Report from a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: String,
    pub dry_run: bool,
    /// Commits that contributed to provenance
    pub commits_scanned: usize,
    /// Commits skipped because they are ignored
    pub commits_ignored: usize,
    pub updated: Vec<FileUpdate>,
    pub unchanged: Vec<PathBuf>,
    pub failures: Vec<ParseFailure>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn new(mode: impl Into<String>, dry_run: bool) -> Self {
        Self {
            mode: mode.into(),
            dry_run,
            ..Self::default()
        }
    }

    /// Number of rules that received metadata changes.
    pub fn rules_updated(&self) -> usize {
        self.updated.iter().map(|f| f.rules.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
