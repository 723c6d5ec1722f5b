//! Commit metadata extraction from git repositories.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use git2::{Commit, DiffOptions, Repository};
use yarameta_fs::NormalizedPath;

use crate::Result;

/// Information about a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full hexadecimal commit id
    pub id: String,

    /// Author timestamp in the author's own UTC offset
    pub authored_at: DateTime<FixedOffset>,

    /// Repository-relative paths added, modified or deleted by this commit
    pub changed_paths: BTreeSet<NormalizedPath>,

    /// Id of the first parent; `None` for a root commit
    pub parent: Option<String>,
}

impl CommitInfo {
    pub fn new(
        id: impl Into<String>,
        authored_at: DateTime<FixedOffset>,
        changed_paths: impl IntoIterator<Item = NormalizedPath>,
    ) -> Self {
        Self {
            id: id.into(),
            authored_at,
            changed_paths: changed_paths.into_iter().collect(),
            parent: None,
        }
    }

    /// Calendar date the commit was authored on, as seen by its author.
    pub fn authored_date(&self) -> NaiveDate {
        self.authored_at.date_naive()
    }

    /// Check whether `id_or_prefix` names this commit.
    ///
    /// Prefixes shorter than 7 characters never match.
    pub fn matches_id(&self, id_or_prefix: &str) -> bool {
        let candidate = id_or_prefix.trim().to_ascii_lowercase();
        candidate.len() >= 7 && self.id.starts_with(&candidate)
    }
}

/// Build a [`CommitInfo`] for `commit`, diffing against its first parent.
///
/// Root commits are diffed against the empty tree so that every file they
/// introduce is reported. Rename detection is off: a moved file shows up
/// under both its old and its new path.
pub(crate) fn commit_info(repo: &Repository, commit: &Commit<'_>) -> Result<CommitInfo> {
    let tree = commit.tree()?;
    let parent = commit.parent(0).ok();
    let parent_tree = match &parent {
        Some(parent) => Some(parent.tree()?),
        None => None,
    };

    let mut opts = DiffOptions::new();
    opts.ignore_submodules(true);
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    let mut changed_paths = BTreeSet::new();
    for delta in diff.deltas() {
        for file in [delta.old_file(), delta.new_file()] {
            if let Some(path) = file.path() {
                changed_paths.insert(NormalizedPath::new(path));
            }
        }
    }

    Ok(CommitInfo {
        id: commit.id().to_string(),
        authored_at: author_time(commit),
        changed_paths,
        parent: parent.map(|p| p.id().to_string()),
    })
}

fn author_time(commit: &Commit<'_>) -> DateTime<FixedOffset> {
    let when = commit.author().when();
    let utc = Utc
        .timestamp_opt(when.seconds(), 0)
        .single()
        .unwrap_or_default();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    utc.with_timezone(&offset)
}
