//! Text edits spliced into rule source on serialization.

use std::ops::Range;

/// The kind of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Insert new content at a zero-width span.
    Insert,
    /// Replace the content of a span.
    Replace,
}

/// An edit operation on source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub kind: EditKind,
    /// Byte range in the original text
    pub span: Range<usize>,
    pub new_content: String,
}

impl Edit {
    pub fn insert(at: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            span: at..at,
            new_content: content.into(),
        }
    }

    pub fn replace(span: Range<usize>, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Replace,
            span,
            new_content: content.into(),
        }
    }

    /// Apply this single edit to `source`.
    pub fn apply(&self, source: &str) -> String {
        let mut result = String::with_capacity(source.len() + self.new_content.len());
        result.push_str(&source[..self.span.start]);
        result.push_str(&self.new_content);
        result.push_str(&source[self.span.end..]);
        result
    }
}

/// Apply a set of non-overlapping edits to `source`.
///
/// Spans always refer to the original text. Edits are applied back to
/// front so earlier spans stay valid; an insertion sharing its offset with
/// a replacement lands before the replaced text.
pub fn apply_all(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then_with(|| (b.kind == EditKind::Replace).cmp(&(a.kind == EditKind::Replace)))
    });

    let mut result = source.to_string();
    for edit in &edits {
        result.replace_range(edit.span.clone(), &edit.new_content);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_single_insert() {
        let edit = Edit::insert(5, ", world");
        assert_eq!(edit.apply("hello!"), "hello, world!");
    }

    #[test]
    fn test_apply_single_replace() {
        let edit = Edit::replace(6..11, "rust");
        assert_eq!(edit.apply("hello world"), "hello rust");
    }

    #[test]
    fn test_apply_all_uses_original_offsets() {
        let source = "a = \"1\"\nb = \"2\"";
        let edits = vec![
            Edit::replace(4..7, "\"one\""),
            Edit::replace(12..15, "\"two\""),
            Edit::insert(15, "\nc = \"3\""),
        ];
        assert_eq!(
            apply_all(source, edits),
            "a = \"one\"\nb = \"two\"\nc = \"3\""
        );
    }

    #[test]
    fn test_apply_all_empty() {
        assert_eq!(apply_all("unchanged", Vec::new()), "unchanged");
    }
}
