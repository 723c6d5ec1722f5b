//! Candidate rule files and how commit paths are matched against them

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use yarameta_fs::NormalizedPath;

use crate::Result;

/// Extensions recognized as rule files.
pub const RULE_EXTENSIONS: &[&str] = &["yara", "yar"];

/// A rule file a run is allowed to touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Where the file is read from and written to
    pub path: PathBuf,
    /// Path relative to the repository root, as git reports it
    pub repo_path: NormalizedPath,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, repo_path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            repo_path: repo_path.into(),
        }
    }

    pub fn basename(&self) -> &str {
        self.repo_path.file_name().unwrap_or_default()
    }
}

/// Lookup table from commit paths to candidates.
///
/// A commit path is matched by basename, so that a rule file keeps its
/// history across moves. When two candidates share a basename that match
/// would be ambiguous; those candidates are matched by exact repository
/// path instead.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    candidates: Vec<Candidate>,
    by_basename: HashMap<String, usize>,
    by_path: HashMap<NormalizedPath, usize>,
    ambiguous: BTreeMap<String, Vec<NormalizedPath>>,
    skipped: Vec<PathBuf>,
}

impl CandidateIndex {
    /// Index the rule files among `files`, which live in the repository at
    /// `root`.
    ///
    /// Files without a rule extension are ignored. Files that do not exist
    /// are skipped and listed in [`CandidateIndex::skipped`].
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file lies outside `root`.
    pub fn build(root: &Path, files: &[PathBuf]) -> Result<Self> {
        let mut candidates = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            if !NormalizedPath::new(file).has_extension(RULE_EXTENSIONS) {
                debug!(path = %file.display(), "Not a rule file, ignoring");
                continue;
            }
            if !file.is_file() {
                warn!(path = %file.display(), "Rule file does not exist, skipping");
                skipped.push(file.clone());
                continue;
            }
            let repo_path = NormalizedPath::relative_to(file, root)?;
            candidates.push(Candidate::new(file.clone(), repo_path));
        }

        let mut index = Self::from_candidates(candidates);
        index.skipped = skipped;
        Ok(index)
    }

    /// Index already-resolved candidates. Duplicate repository paths keep
    /// the first entry.
    pub fn from_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut index = Self::default();
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for candidate in candidates {
            if index.by_path.contains_key(&candidate.repo_path) {
                continue;
            }
            let slot = index.candidates.len();
            index.by_path.insert(candidate.repo_path.clone(), slot);
            groups
                .entry(candidate.basename().to_string())
                .or_default()
                .push(slot);
            index.candidates.push(candidate);
        }

        for (basename, slots) in groups {
            if let [slot] = slots.as_slice() {
                index.by_basename.insert(basename, *slot);
            } else {
                let paths: Vec<_> = slots
                    .iter()
                    .map(|&s| index.candidates[s].repo_path.clone())
                    .collect();
                warn!(%basename, count = paths.len(), "Ambiguous rule file basename, matching by path");
                index.ambiguous.insert(basename, paths);
            }
        }

        index
    }

    /// The candidate a changed path in some commit refers to, if any.
    pub fn resolve(&self, changed: &NormalizedPath) -> Option<&Candidate> {
        if !changed.has_extension(RULE_EXTENSIONS) {
            return None;
        }
        let basename = changed.file_name()?;
        let slot = if self.ambiguous.contains_key(basename) {
            self.by_path.get(changed)
        } else {
            self.by_basename.get(basename)
        };
        slot.map(|&s| &self.candidates[s])
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Basenames shared by more than one candidate, with their paths.
    pub fn ambiguous(&self) -> &BTreeMap<String, Vec<NormalizedPath>> {
        &self.ambiguous
    }

    /// Inputs that had a rule extension but did not exist.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Human-readable warnings about how candidates will be matched.
    pub fn warnings(&self) -> Vec<String> {
        let ambiguous = self.ambiguous.iter().map(|(basename, paths)| {
            let paths: Vec<_> = paths.iter().map(NormalizedPath::as_str).collect();
            format!(
                "basename `{basename}` is shared by {}; matching these files by full path",
                paths.join(", ")
            )
        });
        let skipped = self
            .skipped
            .iter()
            .map(|p| format!("{} does not exist; skipped", p.display()));
        ambiguous.chain(skipped).collect()
    }
}
