//! Shared test utilities for the yara-metadata workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: [`git::GitFixture`], a scratch repository with dated commits
//! - [`rules`]: builders for small YARA rule sources

pub mod git;
pub mod rules;
