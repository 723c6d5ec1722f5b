//! Filesystem helpers for yara-metadata
//!
//! Provides normalized path handling, content-aware file synchronization
//! and format-agnostic settings loading.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::sync_text;
pub use path::NormalizedPath;
