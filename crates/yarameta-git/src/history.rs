//! History provider trait and its git2-backed implementation

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, ObjectType, Oid, Repository, Sort};
use yarameta_fs::NormalizedPath;

use crate::commits::{CommitInfo, commit_info};
use crate::{Error, Result};

/// Read-only view of a repository's commit history.
///
/// The reconciler only ever reads through this trait, which keeps the
/// provenance algorithm independent of git2 and lets tests feed it a
/// synthetic history.
pub trait HistoryProvider {
    /// Ids of every commit reachable from `HEAD`, newest first.
    fn history(&self) -> Result<Vec<String>>;

    /// Full commit information, including the paths it touched.
    fn commit(&self, id: &str) -> Result<CommitInfo>;

    /// Ids reachable from `to` but not from `from` (`from..to`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RevisionNotFound`] if either revision does not resolve.
    fn range(&self, from: &str, to: &str) -> Result<HashSet<String>>;

    /// The commit `HEAD` currently points at.
    fn head(&self) -> Result<CommitInfo>;

    /// Content of `path` as recorded in commit `id`.
    ///
    /// Returns `Ok(None)` when the commit does not contain the file.
    fn file_at(&self, id: &str, path: &NormalizedPath) -> Result<Option<Vec<u8>>>;
}

/// [`HistoryProvider`] over a git repository on disk.
pub struct GitHistory {
    repo: Repository,
    root: PathBuf,
}

impl GitHistory {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotARepository {
                path: path.to_path_buf(),
            },
            _ => Error::Git(e),
        })?;
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::BareRepository {
                path: repo.path().to_path_buf(),
            })?;

        tracing::debug!(root = %root.display(), "Opened git repository");
        Ok(Self { repo, root })
    }

    /// Root of the working tree; git paths are relative to it.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, rev: &str) -> Result<Oid> {
        self.repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|_| Error::RevisionNotFound {
                rev: rev.to_string(),
            })
    }

    fn find_commit(&self, id: &str) -> Result<git2::Commit<'_>> {
        Oid::from_str(id)
            .and_then(|oid| self.repo.find_commit(oid))
            .map_err(|_| Error::CommitNotFound { id: id.to_string() })
    }
}

impl HistoryProvider for GitHistory {
    fn history(&self) -> Result<Vec<String>> {
        let head = self.head_oid()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head)?;
        revwalk.set_sorting(Sort::TIME)?;

        revwalk
            .map(|oid| oid.map(|o| o.to_string()).map_err(Error::from))
            .collect()
    }

    fn commit(&self, id: &str) -> Result<CommitInfo> {
        let commit = self.find_commit(id)?;
        commit_info(&self.repo, &commit)
    }

    fn range(&self, from: &str, to: &str) -> Result<HashSet<String>> {
        let from_oid = self.resolve(from)?;
        let to_oid = self.resolve(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(to_oid)?;
        revwalk.hide(from_oid)?;

        let ids = revwalk
            .map(|oid| oid.map(|o| o.to_string()).map_err(Error::from))
            .collect::<Result<HashSet<_>>>()?;

        tracing::debug!(%from, %to, commits = ids.len(), "Resolved commit range");
        Ok(ids)
    }

    fn head(&self) -> Result<CommitInfo> {
        let oid = self.head_oid()?;
        let commit = self.repo.find_commit(oid)?;
        commit_info(&self.repo, &commit)
    }

    fn file_at(&self, id: &str, path: &NormalizedPath) -> Result<Option<Vec<u8>>> {
        let commit = self.find_commit(id)?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(Path::new(path.as_str())) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }

        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;
        Ok(Some(blob.content().to_vec()))
    }
}

impl GitHistory {
    fn head_oid(&self) -> Result<Oid> {
        match self.repo.head() {
            Ok(head) => Ok(head.peel_to_commit()?.id()),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Err(Error::UnbornHead)
            }
            Err(e) => Err(e.into()),
        }
    }
}
