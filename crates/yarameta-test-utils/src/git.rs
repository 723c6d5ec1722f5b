//! Git repository fixture with controlled author dates.
//!
//! Provenance depends on commit dates, so every commit made through
//! [`GitFixture`] is authored at noon UTC on an explicit calendar day.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use git2::{IndexAddOption, Repository, Signature, Time};
use tempfile::TempDir;

/// A scratch git repository in a temporary directory.
///
/// # Example
///
/// ```rust,no_run
/// use yarameta_test_utils::git::GitFixture;
///
/// let fixture = GitFixture::new();
/// let id = fixture.commit_file("rules/a.yara", "rule a { condition: true }", "2024-01-01");
/// assert_eq!(id.len(), 40);
/// ```
pub struct GitFixture {
    temp_dir: TempDir,
    repo: Repository,
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl GitFixture {
    /// Initialise an empty repository.
    ///
    /// # Panics
    /// Panics if the temporary directory or repository cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("GitFixture::new: failed to create temp dir");
        let repo = Repository::init(temp_dir.path()).unwrap_or_else(|e| {
            panic!(
                "GitFixture::new: failed to init repository at {}: {e}",
                temp_dir.path().display()
            )
        });
        Self { temp_dir, repo }
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` inside the working tree.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// The underlying git2 repository.
    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("GitFixture::write: failed to create parent");
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("GitFixture::write: failed to write {rel}: {e}"));
    }

    /// Read `rel` from the working tree.
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("GitFixture::read: failed to read {rel}: {e}"))
    }

    /// Delete `rel` from the working tree.
    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel))
            .unwrap_or_else(|e| panic!("GitFixture::remove: failed to remove {rel}: {e}"));
    }

    /// Stage every change in the working tree and commit it.
    ///
    /// `date` is a `YYYY-MM-DD` string; author and committer are both set
    /// to noon UTC on that day. Returns the new commit id.
    pub fn commit(&self, message: &str, date: &str) -> String {
        let mut index = self.repo.index().expect("GitFixture::commit: no index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("GitFixture::commit: add_all failed");
        index
            .update_all(["*"], None)
            .expect("GitFixture::commit: update_all failed");
        index.write().expect("GitFixture::commit: index write failed");

        let tree_id = index.write_tree().expect("GitFixture::commit: write_tree failed");
        let tree = self.repo.find_tree(tree_id).expect("GitFixture::commit: no tree");

        let signature = signature_at(date);
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap_or_else(|e| panic!("GitFixture::commit: commit failed: {e}"));
        oid.to_string()
    }

    /// Write one file and commit it on `date`.
    pub fn commit_file(&self, rel: &str, content: &str, date: &str) -> String {
        self.write(rel, content);
        self.commit(&format!("Update {rel}"), date)
    }

    /// Create a branch pointing at the current `HEAD`.
    pub fn branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("GitFixture::branch: HEAD has no commit");
        self.repo
            .branch(name, &head, true)
            .unwrap_or_else(|e| panic!("GitFixture::branch: failed to create {name}: {e}"));
    }
}

/// Signature authored at noon UTC on `date` (`YYYY-MM-DD`).
///
/// # Panics
/// Panics if `date` is not a valid calendar date.
pub fn signature_at(date: &str) -> Signature<'static> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("signature_at: invalid date {date}: {e}"));
    let seconds = day
        .and_hms_opt(12, 0, 0)
        .expect("signature_at: noon is always valid")
        .and_utc()
        .timestamp();
    Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
        .expect("signature_at: failed to build signature")
}
