use proptest::prelude::*;
use yarameta_fs::NormalizedPath;

proptest! {
    #[test]
    fn test_normalized_never_contains_backslash(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        prop_assert!(!path.as_str().contains('\\'));
    }

    #[test]
    fn test_file_name_is_last_segment(dirs in proptest::collection::vec("[a-z]{1,8}", 0..4), name in "[a-z]{1,8}\\.yara") {
        let mut joined = dirs.join("/");
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(&name);

        let path = NormalizedPath::new(&joined);
        prop_assert_eq!(path.file_name(), Some(name.as_str()));
        prop_assert_eq!(path.extension(), Some("yara"));
    }
}
