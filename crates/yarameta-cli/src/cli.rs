//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// Stamp creation and modification dates from git history into YARA rules
#[derive(Parser, Debug)]
#[command(name = "yara-metadata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scan the full history reachable from HEAD
    #[arg(long)]
    pub initial: bool,

    /// Also store the hash of the commit that last modified each rule
    #[arg(long)]
    pub hash: bool,

    /// Commit to leave out of the history (full hash or 7+ character prefix)
    #[arg(long = "ignored-hashes", value_name = "HASH", value_delimiter = ',')]
    pub ignored_hashes: Vec<String>,

    /// Meta key for the creation date [default: created_on]
    #[arg(long, value_name = "KEY")]
    pub created_tag: Option<String>,

    /// Meta key for the last-modified date [default: last_modified]
    #[arg(long, value_name = "KEY")]
    pub modified_tag: Option<String>,

    /// Start of the branch range; with --branch-to, scans only from..to
    #[arg(long, value_name = "REV", env = "YARA_METADATA_BRANCH_FROM")]
    pub branch_from: Option<String>,

    /// End of the branch range
    #[arg(long, value_name = "REV", env = "YARA_METADATA_BRANCH_TO")]
    pub branch_to: Option<String>,

    /// Directory inside the repository
    #[arg(short = 'C', long = "repo", value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Settings file [default: <repo root>/.yara-metadata.toml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Rule files to process; other files are ignored
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}
