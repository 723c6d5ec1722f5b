//! Property-based tests for rule rendering

use proptest::prelude::*;
use yarameta_rules::{MetaValue, RuleFile};
use yarameta_test_utils::rules::rule;

proptest! {
    #[test]
    fn string_values_survive_a_reparse(value in "[ -~\t\n]{0,40}") {
        let mut file = RuleFile::parse(rule("p", &[])).unwrap();
        file.rules_mut()[0].add_meta("note", value.as_str());

        let reparsed = RuleFile::parse(file.text_formatted()).unwrap();
        prop_assert_eq!(
            reparsed.rules()[0].get_meta("note").unwrap().value(),
            &MetaValue::from(value.as_str())
        );
    }

    #[test]
    fn masking_hides_any_date(a in "[0-9]{4}-[0-9]{2}-[0-9]{2}", b in "[0-9]{4}-[0-9]{2}-[0-9]{2}") {
        let left = RuleFile::parse(rule("p", &[("last_modified", a.as_str())])).unwrap();
        let right = RuleFile::parse(rule("p", &[("last_modified", b.as_str())])).unwrap();
        prop_assert_eq!(
            left.rules()[0].masked_text("last_modified"),
            right.rules()[0].masked_text("last_modified")
        );
    }

    #[test]
    fn unmodified_files_render_verbatim(names in proptest::collection::btree_set("[a-z][a-z0-9_]{0,8}", 1..5)) {
        let source: String = names.iter().map(|n| rule(n, &[("author", "x")])).collect::<Vec<_>>().join("\n// gap\n");
        let file = RuleFile::parse(source.clone()).unwrap();
        prop_assert_eq!(file.len(), names.len());
        prop_assert_eq!(file.text_formatted(), source);
    }
}
