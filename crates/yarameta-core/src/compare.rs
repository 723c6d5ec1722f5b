//! Rule-level change detection for local runs

use yarameta_rules::{Rule, lexer};

/// Whether `current` is `previous` up to the value of `modified_tag`.
///
/// Both rules are rendered with that value blanked and compared token by
/// token. Layout is not part of the comparison: re-indenting a rule or
/// editing its comments leaves it unchanged. Any other difference (logic,
/// strings, other metadata) counts as a change.
pub fn rule_unchanged(current: &Rule, previous: &Rule, modified_tag: &str) -> bool {
    let current = current.masked_text(modified_tag);
    let previous = previous.masked_text(modified_tag);
    match (tokens(&current), tokens(&previous)) {
        (Some(a), Some(b)) => a == b,
        _ => current == previous,
    }
}

fn tokens(text: &str) -> Option<Vec<&str>> {
    lexer::tokenize(text)
        .ok()
        .map(|tokens| tokens.iter().map(|t| t.text(text)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yarameta_rules::RuleFile;
    use yarameta_test_utils::rules::{rule, rule_with_condition};

    fn parse(text: String) -> Rule {
        RuleFile::parse(text).unwrap().rules()[0].clone()
    }

    #[test]
    fn test_only_modified_value_differs() {
        let current = parse(rule("r", &[("last_modified", "2024-05-05")]));
        let previous = parse(rule("r", &[("last_modified", "2023-01-01")]));
        assert!(rule_unchanged(&current, &previous, "last_modified"));
    }

    #[test]
    fn test_condition_change_is_detected() {
        let current = parse(rule_with_condition("r", &[("last_modified", "2024-05-05")], "$a and filesize < 1KB"));
        let previous = parse(rule("r", &[("last_modified", "2024-05-05")]));
        assert!(!rule_unchanged(&current, &previous, "last_modified"));
    }

    #[test]
    fn test_other_meta_change_is_detected() {
        let current = parse(rule("r", &[("author", "a"), ("last_modified", "2024-05-05")]));
        let previous = parse(rule("r", &[("author", "b"), ("last_modified", "2024-05-05")]));
        assert!(!rule_unchanged(&current, &previous, "last_modified"));
    }

    #[test]
    fn test_layout_and_comments_are_ignored() {
        let previous = parse(rule("r", &[("last_modified", "2024-05-05")]));
        let reflowed = previous
            .original_text()
            .replace("\n    ", "\n\t\t")
            .replace("condition:", "// reviewed\n  condition: /* ok */");
        let current = parse(reflowed);
        assert!(rule_unchanged(&current, &previous, "last_modified"));
    }

    #[test]
    fn test_whitespace_inside_strings_is_a_change() {
        let current = parse(rule("r", &[("author", "a  b")]));
        let previous = parse(rule("r", &[("author", "a b")]));
        assert!(!rule_unchanged(&current, &previous, "last_modified"));
    }

    #[test]
    fn test_mask_uses_the_configured_tag() {
        let current = parse(rule("r", &[("modified", "2024-05-05")]));
        let previous = parse(rule("r", &[("modified", "2023-01-01")]));
        assert!(!rule_unchanged(&current, &previous, "last_modified"));
        assert!(rule_unchanged(&current, &previous, "modified"));
    }
}
