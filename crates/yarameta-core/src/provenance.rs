//! Folding commit history into per-file provenance records

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, trace, warn};
use yarameta_fs::NormalizedPath;
use yarameta_git::CommitInfo;

use crate::candidate::CandidateIndex;
use crate::{Error, Result};

/// Provenance of one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceRecord {
    pub path: PathBuf,
    pub repo_path: NormalizedPath,
    /// Earliest authored date of a commit touching the file
    pub created_on: NaiveDate,
    /// Latest authored date of a commit touching the file
    pub last_modified: NaiveDate,
    /// Commit that supplied `last_modified`
    pub commit_hash: String,
}

impl ProvenanceRecord {
    fn observe(&mut self, date: NaiveDate, id: &str) {
        if date < self.created_on {
            self.created_on = date;
        }
        // ties keep the commit seen first
        if date > self.last_modified {
            self.last_modified = date;
            self.commit_hash = id.to_string();
        }
    }
}

/// Accumulates [`ProvenanceRecord`]s while commits are fed in.
///
/// Records use min/max over authored dates, so the result does not depend
/// on the order commits arrive in, except for which commit wins a tie on
/// the latest date.
pub struct ProvenanceCollector<'a> {
    index: &'a CandidateIndex,
    ignored: &'a [String],
    records: BTreeMap<NormalizedPath, ProvenanceRecord>,
    seen: usize,
    skipped: usize,
}

impl<'a> ProvenanceCollector<'a> {
    pub fn new(index: &'a CandidateIndex, ignored: &'a [String]) -> Self {
        Self {
            index,
            ignored,
            records: BTreeMap::new(),
            seen: 0,
            skipped: 0,
        }
    }

    /// Whether `commit` is listed in the ignored hashes.
    pub fn is_ignored(&self, commit: &CommitInfo) -> bool {
        self.ignored.iter().any(|h| commit.matches_id(h))
    }

    /// Account for one commit.
    pub fn observe(&mut self, commit: &CommitInfo) {
        if self.is_ignored(commit) {
            debug!(commit = %commit.id, "Skipping ignored commit");
            self.skipped += 1;
            return;
        }
        self.seen += 1;

        let date = commit.authored_date();
        for changed in &commit.changed_paths {
            let Some(candidate) = self.index.resolve(changed) else {
                continue;
            };
            trace!(commit = %commit.id, path = %changed, candidate = %candidate.repo_path, "Commit touches candidate");

            match self.records.get_mut(&candidate.repo_path) {
                Some(record) => record.observe(date, &commit.id),
                None => {
                    self.records.insert(
                        candidate.repo_path.clone(),
                        ProvenanceRecord {
                            path: candidate.path.clone(),
                            repo_path: candidate.repo_path.clone(),
                            created_on: date,
                            last_modified: date,
                            commit_hash: commit.id.clone(),
                        },
                    );
                }
            }
        }
    }

    /// Number of commits observed and number skipped as ignored.
    pub fn counts(&self) -> (usize, usize) {
        (self.seen, self.skipped)
    }

    /// Records keyed by repository path.
    pub fn finish(self) -> BTreeMap<NormalizedPath, ProvenanceRecord> {
        self.records
    }
}

/// Check every ignored hash against the commit ids of the walk.
///
/// # Errors
///
/// Returns [`Error::AmbiguousCommitPrefix`] if an entry is a prefix of more
/// than one id. Entries matching nothing are only logged.
pub fn check_ignored(ignored: &[String], ids: &[String]) -> Result<()> {
    for prefix in ignored {
        let prefix = prefix.trim().to_ascii_lowercase();
        match ids.iter().filter(|id| id.starts_with(&prefix)).count() {
            0 => warn!(%prefix, "Ignored hash matches no commit"),
            1 => {}
            matches => return Err(Error::AmbiguousCommitPrefix { prefix, matches }),
        }
    }
    Ok(())
}
