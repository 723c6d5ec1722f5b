//! The stamping run: settings, mode selection, reconciliation and output

use colored::Colorize;

use yarameta_core::{
    CandidateIndex, ChangeKind, Mode, ReconcileOptions, Reconciler, RunReport, Settings,
    SettingsOverrides,
};
use yarameta_git::GitHistory;

use crate::cli::Cli;
use crate::error::Result;

/// Run one reconciliation as described by `cli` and print its report.
///
/// Parse failures are printed but do not fail the command.
pub fn run_stamp(cli: &Cli) -> Result<()> {
    let history = GitHistory::discover(&cli.repo)?;
    let root = history.root().to_path_buf();

    let settings = Settings::resolve(&root, cli.config.as_deref())?.merge(SettingsOverrides {
        created_tag: cli.created_tag.clone(),
        modified_tag: cli.modified_tag.clone(),
        store_commit_hash: cli.hash,
        ignored_hashes: cli.ignored_hashes.clone(),
    });
    settings.validate()?;

    let mode = Mode::select(
        cli.initial,
        cli.branch_from.as_deref(),
        cli.branch_to.as_deref(),
    );
    if !cli.initial && mode == Mode::Local && (cli.branch_from.is_some() || cli.branch_to.is_some()) {
        tracing::warn!("Only one end of the branch range is set, falling back to local mode");
    }

    let index = CandidateIndex::build(&root, &cli.files)?;
    let report = if index.is_empty() {
        tracing::debug!("No rule files among the inputs");
        let mut report = RunReport::new(mode.to_string(), cli.dry_run);
        report.warnings = index.warnings();
        report
    } else {
        Reconciler::new(&history, &settings, ReconcileOptions::new(cli.dry_run))
            .run(&mode, &index)?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    let heading = if report.dry_run {
        "Checking rule metadata (dry run)"
    } else {
        "Stamping rule metadata"
    };
    println!("{} {} [{}]", "=>".blue().bold(), heading, report.mode.dimmed());

    for warning in &report.warnings {
        println!("   {} {}", "!".yellow(), warning);
    }

    for file in &report.updated {
        println!("   {} {}", "+".green(), file.path.display().to_string().cyan());
        for rule in &file.rules {
            let changes: Vec<String> = rule
                .changes
                .iter()
                .map(|c| {
                    let verb = match c.kind {
                        ChangeKind::Created => "set",
                        ChangeKind::Updated => "updated",
                    };
                    format!("{verb} {} = \"{}\"", c.key, c.value)
                })
                .collect();
            println!("       {}: {}", rule.rule, changes.join(", ").dimmed());
        }
        if let Some(diff) = &file.diff {
            print_diff(diff);
        }
    }

    for failure in &report.failures {
        println!(
            "   {} {}: {}",
            "x".red().bold(),
            failure.path.display().to_string().cyan(),
            failure.error
        );
        println!("       would have written: {}", failure.metadata.dimmed());
    }

    let files = report.updated.len();
    let rules = report.rules_updated();
    let verb = if report.dry_run { "would be updated" } else { "updated" };
    let status = if report.has_failures() {
        "DONE".yellow().bold()
    } else {
        "OK".green().bold()
    };
    println!(
        "{} {} rule(s) in {} file(s) {}, {} unchanged, {} failed to parse",
        status,
        rules,
        files,
        verb,
        report.unchanged.len(),
        report.failures.len()
    );
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        let line = if line.starts_with("+++") || line.starts_with("---") {
            line.bold()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("       {line}");
    }
}
