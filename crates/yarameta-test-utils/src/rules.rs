//! Builders for YARA rule text used across test suites.

/// Render a rule with the given meta entries and a trivial condition.
///
/// ```rust
/// use yarameta_test_utils::rules::rule;
///
/// let text = rule("demo", &[("author", "me")]);
/// assert!(text.contains("author = \"me\""));
/// ```
pub fn rule(name: &str, meta: &[(&str, &str)]) -> String {
    rule_with_condition(name, meta, "$a")
}

/// Render a rule with meta entries, one string and a custom condition.
pub fn rule_with_condition(name: &str, meta: &[(&str, &str)], condition: &str) -> String {
    let mut out = format!("rule {name}\n{{\n");
    if !meta.is_empty() {
        out.push_str("  meta:\n");
        for (key, value) in meta {
            out.push_str(&format!("    {key} = \"{value}\"\n"));
        }
    }
    out.push_str("  strings:\n    $a = \"needle\"\n");
    out.push_str(&format!("  condition:\n    {condition}\n}}\n"));
    out
}
