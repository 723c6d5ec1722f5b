//! Unified diffs for previewing rewrites.

use similar::TextDiff;

/// Render a unified diff between two versions of the file at `path`.
///
/// Returns an empty string when the texts are identical.
pub fn unified_diff(old: &str, new: &str, path: &str) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}
