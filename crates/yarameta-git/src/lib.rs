//! Git history access for yara-metadata
//!
//! Exposes the commit graph through the [`HistoryProvider`] trait so the
//! reconciler can run against a real repository ([`GitHistory`]) or an
//! in-memory history in tests.

pub mod commits;
pub mod error;
pub mod history;

pub use commits::CommitInfo;
pub use error::{Error, Result};
pub use history::{GitHistory, HistoryProvider};
