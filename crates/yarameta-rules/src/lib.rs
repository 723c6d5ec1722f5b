//! YARA rule-text parsing and metadata editing for yara-metadata
//!
//! Understands just enough of the YARA grammar to find rule boundaries,
//! names, tags and `meta:` entries. Edits are kept as pending changes on
//! each [`Rule`] and spliced into the original text on serialization, so
//! everything outside the touched metadata values stays byte-identical.

pub mod diff;
pub mod edit;
pub mod error;
pub mod lexer;
pub mod meta;
mod parser;
pub mod rule;
pub mod rule_file;

pub use diff::unified_diff;
pub use edit::{Edit, EditKind};
pub use error::{Error, Result};
pub use meta::{Meta, MetaValue};
pub use rule::Rule;
pub use rule_file::RuleFile;
