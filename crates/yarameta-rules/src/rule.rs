//! A single parsed YARA rule and its pending metadata edits.

use crate::edit::{self, Edit};
use crate::meta::{Meta, MetaValue};

/// Where new `meta:` entries go when a rule gains them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MetaInsertion {
    /// After the value of the last existing entry.
    AfterEntry { at: usize, indent: String },
    /// Directly below an empty `meta:` header.
    IntoSection { at: usize, indent: String },
    /// No `meta:` section yet; one is created right after the opening brace.
    NewSection {
        at: usize,
        header_indent: String,
        entry_indent: String,
        /// Line break needed when the next section shares the brace's line
        trailing: &'static str,
    },
}

impl MetaInsertion {
    fn offset(&self) -> usize {
        match self {
            Self::AfterEntry { at, .. }
            | Self::IntoSection { at, .. }
            | Self::NewSection { at, .. } => *at,
        }
    }

    fn render<'a>(&self, newline: &str, entries: impl Iterator<Item = (&'a str, String)>) -> String {
        let (mut text, indent, trailing) = match self {
            Self::AfterEntry { indent, .. } | Self::IntoSection { indent, .. } => {
                (String::new(), indent, "")
            }
            Self::NewSection {
                header_indent,
                entry_indent,
                trailing,
                ..
            } => (format!("{newline}{header_indent}meta:"), entry_indent, *trailing),
        };

        for (key, value) in entries {
            text.push_str(&format!("{newline}{indent}{key} = {value}"));
        }
        text.push_str(trailing);
        text
    }
}

/// A named YARA rule.
///
/// The rule keeps its original source text; metadata changes are recorded
/// on the entries and only materialize when the rule is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Byte offset of the rule inside its file
    pub(crate) offset: usize,
    pub(crate) name: String,
    pub(crate) tags: Vec<String>,
    pub(crate) modifiers: Vec<String>,
    pub(crate) source: String,
    pub(crate) metas: Vec<Meta>,
    pub(crate) insertion: MetaInsertion,
    /// Line ending used for inserted lines, taken from the file
    pub(crate) newline: &'static str,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// `private` / `global` modifiers in source order.
    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    /// All metadata entries, parsed ones first, then added ones.
    pub fn metas(&self) -> &[Meta] {
        &self.metas
    }

    /// First entry named `key`.
    pub fn get_meta(&self, key: &str) -> Option<&Meta> {
        self.metas.iter().find(|m| m.key() == key)
    }

    /// Append a new entry; existing entries with the same key are kept.
    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.metas.push(Meta::added(key.into(), value.into()));
    }

    /// Replace the value of the first entry named `key`.
    ///
    /// Returns `false` if the rule has no such entry.
    pub fn update_meta(&mut self, key: &str, value: impl Into<MetaValue>) -> bool {
        match self.metas.iter_mut().find(|m| m.key() == key) {
            Some(meta) => {
                meta.set_value(value.into());
                true
            }
            None => false,
        }
    }

    /// Whether any metadata entry was added or changed since parsing.
    pub fn is_modified(&self) -> bool {
        self.metas.iter().any(Meta::is_modified)
    }

    /// The rule text as parsed, without pending edits.
    pub fn original_text(&self) -> &str {
        &self.source
    }

    /// The rule text with pending edits applied.
    pub fn text(&self) -> String {
        self.render(None)
    }

    /// The rule text with every `masked_key` value rendered as `""`.
    ///
    /// Two rules whose masked texts are equal differ at most in that one
    /// metadata value. The rule itself is not modified.
    pub fn masked_text(&self, masked_key: &str) -> String {
        self.render(Some(masked_key))
    }

    fn render(&self, masked_key: Option<&str>) -> String {
        let masked = |meta: &Meta| masked_key == Some(meta.key());
        let literal = |meta: &Meta| {
            if masked(meta) {
                MetaValue::String(String::new()).to_string()
            } else {
                meta.value().to_string()
            }
        };

        let mut edits: Vec<Edit> = self
            .metas
            .iter()
            .filter_map(|meta| {
                let span = meta.span.clone()?;
                (masked(meta) || meta.updated).then(|| Edit::replace(span, literal(meta)))
            })
            .collect();

        if self.metas.iter().any(Meta::is_new) {
            let added = self
                .metas
                .iter()
                .filter(|m| m.is_new())
                .map(|m| (m.key(), literal(m)));
            edits.push(Edit::insert(
                self.insertion.offset(),
                self.insertion.render(self.newline, added),
            ));
        }

        edit::apply_all(&self.source, edits)
    }
}
