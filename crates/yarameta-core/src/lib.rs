//! Provenance reconciliation for yara-metadata
//!
//! This crate sits above the Layer 0 crates and below the CLI:
//!
//! ```text
//!                  yarameta-cli
//!                        |
//!                  yarameta-core
//!                        |
//!        +---------------+---------------+
//!        |               |               |
//!  yarameta-fs     yarameta-git    yarameta-rules
//! ```
//!
//! - **Candidates**: the set of rule files a run may touch, indexed by
//!   basename and repository path
//! - **Provenance**: created-on / last-modified dates folded out of the
//!   commit history
//! - **Metadata writer**: create-or-update of the provenance entries on a rule
//! - **Reconciler**: the three run modes, parse-failure reporting and
//!   file persistence

pub mod candidate;
pub mod compare;
pub mod config;
pub mod error;
pub mod mode;
pub mod provenance;
pub mod reconciler;
pub mod report;
pub mod writer;

pub use candidate::{Candidate, CandidateIndex, RULE_EXTENSIONS};
pub use compare::rule_unchanged;
pub use config::{Settings, SettingsOverrides};
pub use error::{Error, Result};
pub use mode::Mode;
pub use provenance::{ProvenanceCollector, ProvenanceRecord};
pub use reconciler::{ReconcileOptions, Reconciler};
pub use report::{FileUpdate, ParseFailure, RuleUpdate, RunReport};
pub use writer::{ChangeKind, MetaChange, MetadataWriter, Stamp, COMMIT_HASH_KEY};
