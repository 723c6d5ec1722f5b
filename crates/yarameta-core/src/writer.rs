//! Create-or-update of provenance metadata on a single rule

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use yarameta_rules::{MetaValue, Rule};

use crate::config::Settings;

/// Meta key used for the commit hash.
pub const COMMIT_HASH_KEY: &str = "commit_hash";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Provenance values to bring a rule in line with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub created_on: NaiveDate,
    pub last_modified: NaiveDate,
    pub commit_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
}

/// One metadata entry written to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaChange {
    pub kind: ChangeKind,
    pub key: String,
    pub value: String,
}

/// Applies [`Stamp`]s to rules according to the run's [`Settings`].
#[derive(Debug, Clone)]
pub struct MetadataWriter {
    created_tag: String,
    modified_tag: String,
    store_commit_hash: bool,
}

impl MetadataWriter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            created_tag: settings.created_tag.clone(),
            modified_tag: settings.modified_tag.clone(),
            store_commit_hash: settings.store_commit_hash,
        }
    }

    pub fn modified_tag(&self) -> &str {
        &self.modified_tag
    }

    /// Bring `rule`'s provenance entries in line with `stamp`.
    ///
    /// The created tag is only ever added, never changed. The modified tag
    /// and (when enabled) the commit hash are added or updated. Entries that
    /// already hold the right value are left alone, so an empty result means
    /// the rule was not touched.
    pub fn stamp(&self, rule: &mut Rule, stamp: &Stamp) -> Vec<MetaChange> {
        let mut changes = Vec::new();

        if rule.get_meta(&self.created_tag).is_none() {
            let value = format_date(stamp.created_on);
            rule.add_meta(self.created_tag.as_str(), value.as_str());
            changes.push(MetaChange {
                kind: ChangeKind::Created,
                key: self.created_tag.clone(),
                value,
            });
        }

        changes.extend(set_string(
            rule,
            &self.modified_tag,
            format_date(stamp.last_modified),
        ));

        if self.store_commit_hash
            && let Some(hash) = &stamp.commit_hash
        {
            changes.extend(set_string(rule, COMMIT_HASH_KEY, hash.clone()));
        }

        changes
    }

    /// The entries [`MetadataWriter::stamp`] would write to a rule with no
    /// provenance at all, rendered as `key = "value"` pairs.
    pub fn describe(&self, stamp: &Stamp) -> String {
        let mut entries = vec![
            (self.created_tag.as_str(), format_date(stamp.created_on)),
            (self.modified_tag.as_str(), format_date(stamp.last_modified)),
        ];
        if self.store_commit_hash
            && let Some(hash) = &stamp.commit_hash
        {
            entries.push((COMMIT_HASH_KEY, hash.clone()));
        }

        entries
            .into_iter()
            .map(|(key, value)| format!("{key} = {}", MetaValue::from(value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Create `key` or update its value when it differs from `value`.
fn set_string(rule: &mut Rule, key: &str, value: String) -> Option<MetaChange> {
    let kind = match rule.get_meta(key).map(|m| m.value()) {
        Some(MetaValue::String(current)) if *current == value => return None,
        Some(_) => {
            rule.update_meta(key, value.as_str());
            ChangeKind::Updated
        }
        None => {
            rule.add_meta(key, value.as_str());
            ChangeKind::Created
        }
    };
    Some(MetaChange {
        kind,
        key: key.to_string(),
        value,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
