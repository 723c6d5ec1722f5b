//! Command implementations for yarameta-cli

pub mod stamp;

pub use stamp::run_stamp;
