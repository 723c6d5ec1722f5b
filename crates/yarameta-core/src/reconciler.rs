//! Provenance reconciler
//!
//! Drives one run: gathers provenance for the candidate files according to
//! the [`Mode`], stamps each rule through the [`MetadataWriter`] and
//! persists changed files.
//!
//! - **Full history**: every commit reachable from `HEAD` is folded into a
//!   [`ProvenanceRecord`] per candidate.
//! - **Branch range**: the same, restricted to the commits in `from..to`,
//!   still in `HEAD` history order.
//! - **Local**: each rule on disk is compared with the same rule in the
//!   first parent of `HEAD`; rules that changed beyond their modified date
//!   are stamped with today's date and `HEAD`'s id.
//!
//! A file that cannot be parsed is reported and left alone; the run
//! carries on with the remaining files.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use yarameta_fs::NormalizedPath;
use yarameta_git::HistoryProvider;
use yarameta_rules::{Rule, RuleFile, unified_diff};

use crate::Result;
use crate::candidate::CandidateIndex;
use crate::compare::rule_unchanged;
use crate::config::Settings;
use crate::mode::Mode;
use crate::provenance::{ProvenanceCollector, ProvenanceRecord, check_ignored};
use crate::report::{FileUpdate, ParseFailure, RuleUpdate, RunReport};
use crate::writer::{MetadataWriter, Stamp};

/// Options for a reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// If true, compute every change but write nothing.
    /// Updated files carry a unified diff in the report instead.
    pub dry_run: bool,
    /// Date stamped by local runs
    pub today: NaiveDate,
}

impl ReconcileOptions {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            today: Local::now().date_naive(),
        }
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Reconciles rule metadata with a history provider.
pub struct Reconciler<'a, H: HistoryProvider + ?Sized> {
    history: &'a H,
    settings: &'a Settings,
    writer: MetadataWriter,
    options: ReconcileOptions,
}

impl<'a, H: HistoryProvider + ?Sized> Reconciler<'a, H> {
    pub fn new(history: &'a H, settings: &'a Settings, options: ReconcileOptions) -> Self {
        Self {
            history,
            settings,
            writer: MetadataWriter::new(settings),
            options,
        }
    }

    /// Run `mode` over the candidates in `index`.
    ///
    /// # Errors
    ///
    /// Fails on history access errors (including unresolvable range
    /// revisions) and on I/O errors while reading or writing candidates.
    /// Rule files that do not parse are reported, not returned as errors.
    pub fn run(&self, mode: &Mode, index: &CandidateIndex) -> Result<RunReport> {
        let mut report = RunReport::new(mode.to_string(), self.options.dry_run);
        report.warnings = index.warnings();

        tracing::debug!(%mode, candidates = index.len(), dry_run = self.options.dry_run, "Starting run");

        match mode {
            Mode::FullHistory => {
                let ids = self.history.history()?;
                check_ignored(&self.settings.ignored_hashes, &ids)?;
                self.reconcile_history(&ids, index, &mut report)?;
            }
            Mode::BranchRange { from, to } => {
                let range = self.history.range(from, to)?;
                let all = self.history.history()?;
                check_ignored(&self.settings.ignored_hashes, &all)?;
                let ids: Vec<String> = all.into_iter().filter(|id| range.contains(id)).collect();
                if ids.len() < range.len() {
                    tracing::warn!(
                        in_range = range.len(),
                        reachable = ids.len(),
                        "Some commits in the range are not reachable from HEAD"
                    );
                }
                self.reconcile_history(&ids, index, &mut report)?;
            }
            Mode::Local => self.reconcile_local(index, &mut report)?,
        }

        tracing::info!(
            updated = report.updated.len(),
            unchanged = report.unchanged.len(),
            failures = report.failures.len(),
            "Run complete"
        );
        Ok(report)
    }

    fn reconcile_history(
        &self,
        ids: &[String],
        index: &CandidateIndex,
        report: &mut RunReport,
    ) -> Result<()> {
        let mut collector = ProvenanceCollector::new(index, &self.settings.ignored_hashes);
        for id in ids {
            let commit = self.history.commit(id)?;
            collector.observe(&commit);
        }
        (report.commits_scanned, report.commits_ignored) = collector.counts();

        let records = collector.finish();
        tracing::debug!(records = records.len(), "Collected provenance");

        for record in records.values() {
            let stamp = stamp_for(record);
            self.update_file(&record.path, &record.repo_path, &stamp, |_| true, report)?;
        }
        Ok(())
    }

    fn reconcile_local(&self, index: &CandidateIndex, report: &mut RunReport) -> Result<()> {
        let head = self.history.head()?;
        let stamp = Stamp {
            created_on: self.options.today,
            last_modified: self.options.today,
            commit_hash: Some(head.id.clone()),
        };
        let modified_tag = self.writer.modified_tag();

        if head.parent.is_none() {
            tracing::debug!(head = %head.id, "HEAD is a root commit, every rule is new");
        }

        for candidate in index.candidates() {
            let baseline = match &head.parent {
                Some(parent) => self.baseline(parent, &candidate.repo_path)?,
                None => RuleFile::default(),
            };
            let changed = |rule: &Rule| {
                baseline
                    .rule(rule.name())
                    .is_none_or(|previous| !rule_unchanged(rule, previous, modified_tag))
            };
            self.update_file(&candidate.path, &candidate.repo_path, &stamp, changed, report)?;
        }
        Ok(())
    }

    /// Rules of `repo_path` as committed in `id`.
    ///
    /// A file missing from the commit, or one that does not parse there,
    /// counts as having no rules.
    fn baseline(&self, id: &str, repo_path: &NormalizedPath) -> Result<RuleFile> {
        let Some(bytes) = self.history.file_at(id, repo_path)? else {
            tracing::debug!(path = %repo_path, commit = %id, "File is new since the parent commit");
            return Ok(RuleFile::default());
        };
        match RuleFile::parse_bytes(&bytes) {
            Ok(file) => Ok(file),
            Err(e) => {
                tracing::debug!(path = %repo_path, error = %e, "Baseline does not parse, treating as empty");
                Ok(RuleFile::default())
            }
        }
    }

    /// Stamp the rules of one file selected by `should_stamp` and persist
    /// the result.
    fn update_file(
        &self,
        path: &Path,
        repo_path: &NormalizedPath,
        stamp: &Stamp,
        should_stamp: impl Fn(&Rule) -> bool,
        report: &mut RunReport,
    ) -> Result<()> {
        let bytes = fs::read(path).map_err(|e| yarameta_fs::Error::io(path, e))?;

        let mut file = match RuleFile::parse_bytes(&bytes) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %repo_path, error = %e, "Failed to parse rule file, skipping");
                report.failures.push(ParseFailure {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                    metadata: self.writer.describe(stamp),
                });
                return Ok(());
            }
        };

        let mut rules = Vec::new();
        for rule in file.rules_mut() {
            if !should_stamp(&*rule) {
                tracing::trace!(rule = rule.name(), "Rule unchanged");
                continue;
            }
            let changes = self.writer.stamp(rule, stamp);
            if !changes.is_empty() {
                rules.push(RuleUpdate {
                    rule: rule.name().to_string(),
                    changes,
                });
            }
        }

        if rules.is_empty() {
            report.unchanged.push(path.to_path_buf());
            return Ok(());
        }

        let text = file.text_formatted();
        let diff = if self.options.dry_run {
            tracing::info!(path = %repo_path, rules = rules.len(), "[dry-run] Would update rule file");
            Some(unified_diff(
                &String::from_utf8_lossy(&bytes),
                &text,
                repo_path.as_str(),
            ))
        } else {
            yarameta_fs::sync_text(path, &text)?;
            tracing::info!(path = %repo_path, rules = rules.len(), "Updated rule file");
            None
        };

        report.updated.push(FileUpdate {
            path: path.to_path_buf(),
            rules,
            diff,
        });
        Ok(())
    }
}

fn stamp_for(record: &ProvenanceRecord) -> Stamp {
    Stamp {
        created_on: record.created_on,
        last_modified: record.last_modified,
        commit_hash: Some(record.commit_hash.clone()),
    }
}
