//! CLI end-to-end tests that invoke the compiled `yara-metadata` binary.
//!
//! These tests use `env!("CARGO_BIN_EXE_yara-metadata")` to locate the
//! binary and run it inside scratch git repositories.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use yarameta_test_utils::git::GitFixture;
use yarameta_test_utils::rules::{rule, rule_with_condition};

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_yara-metadata"))
}

fn command(dir: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("YARA_METADATA_BRANCH_FROM")
        .env_remove("YARA_METADATA_BRANCH_TO");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    command(dir)
        .args(args)
        .output()
        .expect("failed to execute yara-metadata binary")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

/// Three commits touching `rules/a.yara` on Jan 1st, Feb 1st and Mar 1st.
fn three_commit_fixture() -> GitFixture {
    let fixture = GitFixture::new();
    fixture.commit_file("rules/a.yara", &rule("a", &[]), "2024-01-01");
    fixture.commit_file("rules/a.yara", &rule_with_condition("a", &[], "#a > 1"), "2024-02-01");
    fixture.commit_file("rules/a.yara", &rule_with_condition("a", &[], "#a > 2"), "2024-03-01");
    fixture
}

#[test]
fn test_help_exits_zero() {
    let out = Command::new(bin()).arg("--help").output().unwrap();
    assert!(out.status.success(), "--help should exit 0");
    assert!(stdout(&out).contains("--initial"));
}

#[test]
fn test_outside_repository_fails() {
    let temp = TempDir::new().unwrap();
    let out = run(temp.path(), &["--initial", "a.yara"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Not a git repository"), "stderr: {}", stderr(&out));
}

#[test]
fn test_initial_run_stamps_rule() {
    let fixture = three_commit_fixture();
    let out = run(fixture.root(), &["--initial", "rules/a.yara"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = fixture.read("rules/a.yara");
    assert!(text.contains("created_on = \"2024-01-01\""));
    assert!(text.contains("last_modified = \"2024-03-01\""));
    assert!(stdout(&out).contains("rules/a.yara"));
}

#[test]
fn test_custom_tags_and_hash() {
    let fixture = three_commit_fixture();
    let head = fixture.repo().head().unwrap().target().unwrap().to_string();

    let out = run(
        fixture.root(),
        &[
            "--initial",
            "--hash",
            "--created-tag",
            "first_seen",
            "--modified-tag",
            "last_seen",
            "rules/a.yara",
        ],
    );

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = fixture.read("rules/a.yara");
    assert!(text.contains("first_seen = \"2024-01-01\""));
    assert!(text.contains("last_seen = \"2024-03-01\""));
    assert!(text.contains(&format!("commit_hash = \"{head}\"")));
}

#[test]
fn test_json_report() {
    let fixture = three_commit_fixture();
    let out = run(fixture.root(), &["--initial", "--json", "rules/a.yara"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["mode"], "full-history");
    assert_eq!(report["commits_scanned"], 3);
    assert_eq!(report["updated"].as_array().unwrap().len(), 1);
}

#[test]
fn test_dry_run_does_not_write() {
    let fixture = three_commit_fixture();
    let before = fixture.read("rules/a.yara");

    let out = run(fixture.root(), &["--initial", "--dry-run", "rules/a.yara"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(fixture.read("rules/a.yara"), before);
    assert!(stdout(&out).contains("+    created_on = \"2024-01-01\""));
}

#[test]
fn test_parse_failure_is_reported_but_succeeds() {
    let fixture = GitFixture::new();
    let broken = "rule broken {\n  strings:\n    $a = \"x\"\n}\n";
    fixture.write("rules/broken.yara", broken);
    fixture.write("rules/good.yara", &rule("good", &[]));
    fixture.commit("Add rules", "2024-01-01");

    let out = run(
        fixture.root(),
        &["--initial", "rules/broken.yara", "rules/good.yara"],
    );

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(fixture.read("rules/broken.yara"), broken);
    assert!(fixture.read("rules/good.yara").contains("created_on = \"2024-01-01\""));
    let printed = stdout(&out);
    assert!(printed.contains("would have written"));
    assert!(printed.contains("created_on = \"2024-01-01\", last_modified = \"2024-01-01\""));
}

#[test]
fn test_branch_range_from_environment() {
    let fixture = GitFixture::new();
    fixture.commit_file("rules/a.yara", &rule("a", &[]), "2024-01-01");
    fixture.branch("base");
    fixture.commit_file("rules/a.yara", &rule_with_condition("a", &[], "#a > 1"), "2024-02-01");

    let out = command(fixture.root())
        .env("YARA_METADATA_BRANCH_FROM", "base")
        .env("YARA_METADATA_BRANCH_TO", "HEAD")
        .args(["--json", "rules/a.yara"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["mode"], "branch-range base..HEAD");
    assert!(fixture.read("rules/a.yara").contains("created_on = \"2024-02-01\""));
}

#[test]
fn test_unknown_revision_is_fatal() {
    let fixture = three_commit_fixture();
    let before = fixture.read("rules/a.yara");

    let out = run(
        fixture.root(),
        &["--branch-from", "no-such-branch", "--branch-to", "HEAD", "rules/a.yara"],
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("no-such-branch"));
    assert_eq!(fixture.read("rules/a.yara"), before);
}

#[test]
fn test_settings_file_is_picked_up() {
    let fixture = three_commit_fixture();
    fixture.write(".yara-metadata.toml", "created_tag = \"born\"\n");

    let out = run(fixture.root(), &["--initial", "rules/a.yara"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(fixture.read("rules/a.yara").contains("born = \"2024-01-01\""));
}

#[test]
fn test_invalid_tag_is_rejected() {
    let fixture = three_commit_fixture();
    let out = run(fixture.root(), &["--created-tag", "not a key", "rules/a.yara"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("created_tag"));
}

#[test]
fn test_local_mode_twice_is_stable() {
    let fixture = GitFixture::new();
    fixture.commit_file("rules/a.yara", &rule("a", &[]), "2024-01-01");
    fixture.write("rules/a.yara", &rule_with_condition("a", &[], "#a > 3"));

    let first = run(fixture.root(), &["rules/a.yara"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let after_first = fixture.read("rules/a.yara");
    assert!(after_first.contains("last_modified = \""));

    let second = run(fixture.root(), &["--json", "rules/a.yara"]);
    assert!(second.status.success());
    let report: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    assert!(report["updated"].as_array().unwrap().is_empty());
    assert_eq!(fixture.read("rules/a.yara"), after_first);
}

#[test]
fn test_local_mode_after_commit_stamps_last_change() {
    let fixture = GitFixture::new();
    let dated = [("created_on", "2023-01-01"), ("last_modified", "2023-01-01")];
    fixture.commit_file("rules/a.yara", &rule("a", &dated), "2024-01-01");
    fixture.commit_file("rules/a.yara", &rule_with_condition("a", &dated, "#a > 3"), "2024-02-01");

    let out = run(fixture.root(), &["--json", "rules/a.yara"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["mode"], "local");
    assert_eq!(report["updated"].as_array().unwrap().len(), 1);
    let text = fixture.read("rules/a.yara");
    assert!(text.contains("created_on = \"2023-01-01\""));
    assert!(!text.contains("last_modified = \"2023-01-01\""));
}
