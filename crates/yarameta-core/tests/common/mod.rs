//! In-memory history for reconciler tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate};
use yarameta_fs::NormalizedPath;
use yarameta_git::{CommitInfo, Error, HistoryProvider, Result};

/// A synthetic linear history, newest commit first.
#[derive(Default)]
pub struct FakeHistory {
    commits: Vec<CommitInfo>,
    files: HashMap<(String, NormalizedPath), Vec<u8>>,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit older than every commit added so far.
    pub fn older_commit(mut self, id: &str, date: &str, paths: &[&str]) -> Self {
        let authored_at = DateTime::parse_from_rfc3339(&format!("{date}T12:00:00+00:00")).unwrap();
        if let Some(child) = self.commits.last_mut() {
            child.parent = Some(id.to_string());
        }
        self.commits.push(CommitInfo::new(
            id,
            authored_at,
            paths.iter().map(|p| NormalizedPath::new(*p)),
        ));
        self
    }

    /// Record the content of `path` in commit `id`.
    pub fn with_file(mut self, id: &str, path: &str, content: &str) -> Self {
        self.files
            .insert((id.to_string(), NormalizedPath::new(path)), content.as_bytes().to_vec());
        self
    }

    fn position(&self, rev: &str) -> Result<usize> {
        self.commits
            .iter()
            .position(|c| c.id == rev)
            .ok_or_else(|| Error::RevisionNotFound { rev: rev.to_string() })
    }
}

impl HistoryProvider for FakeHistory {
    fn history(&self) -> Result<Vec<String>> {
        Ok(self.commits.iter().map(|c| c.id.clone()).collect())
    }

    fn commit(&self, id: &str) -> Result<CommitInfo> {
        self.commits
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Error::CommitNotFound { id: id.to_string() })
    }

    fn range(&self, from: &str, to: &str) -> Result<HashSet<String>> {
        let from = self.position(from)?;
        let to = self.position(to)?;
        Ok(self.commits[to.min(from)..from]
            .iter()
            .map(|c| c.id.clone())
            .collect())
    }

    fn head(&self) -> Result<CommitInfo> {
        self.commits.first().cloned().ok_or(Error::UnbornHead)
    }

    fn file_at(&self, id: &str, path: &NormalizedPath) -> Result<Option<Vec<u8>>> {
        Ok(self.files.get(&(id.to_string(), path.clone())).cloned())
    }
}

/// A 40-character id made of `c` repeated.
pub fn id(c: char) -> String {
    std::iter::repeat_n(c, 40).collect()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
