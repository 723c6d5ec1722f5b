use std::fs;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Deserialize;
use tempfile::TempDir;
use yarameta_fs::{ConfigStore, Error};

#[derive(Debug, Deserialize, PartialEq)]
struct Sample {
    created_tag: String,
    #[serde(default)]
    ignored_hashes: Vec<String>,
}

#[rstest]
#[case("settings.toml", "created_tag = \"date\"\nignored_hashes = [\"abc1234\"]\n")]
#[case("settings.json", r#"{"created_tag": "date", "ignored_hashes": ["abc1234"]}"#)]
#[case("settings.yaml", "created_tag: date\nignored_hashes:\n  - abc1234\n")]
#[case("settings.yml", "created_tag: date\nignored_hashes: [abc1234]\n")]
fn test_load_by_extension(#[case] name: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();

    let loaded: Sample = ConfigStore::new().load(&path).unwrap();

    assert_eq!(
        loaded,
        Sample {
            created_tag: "date".into(),
            ignored_hashes: vec!["abc1234".into()],
        }
    );
}

#[test]
fn test_load_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.ini");
    fs::write(&path, "created_tag=date").unwrap();

    let result: Result<Sample, _> = ConfigStore::new().load(&path);
    assert!(matches!(result, Err(Error::UnsupportedFormat { extension }) if extension == "ini"));
}

#[test]
fn test_load_invalid_toml_reports_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.toml");
    fs::write(&path, "created_tag = ").unwrap();

    let result: Result<Sample, _> = ConfigStore::new().load(&path);
    match result {
        Err(Error::ConfigParse { format, .. }) => assert_eq!(format, "TOML"),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}
