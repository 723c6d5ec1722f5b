//! Rule metadata entries.

use std::fmt;
use std::ops::Range;

use crate::lexer;

/// A literal value in a rule's `meta:` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl MetaValue {
    /// The decoded text, if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Renders the value as YARA source.
impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(&lexer::escape(s)),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// One `key = value` entry of a rule's `meta:` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    key: String,
    value: MetaValue,
    /// Span of the value literal inside the rule text; `None` for entries
    /// added since the rule was parsed.
    pub(crate) span: Option<Range<usize>>,
    pub(crate) updated: bool,
}

impl Meta {
    pub(crate) fn parsed(key: String, value: MetaValue, span: Range<usize>) -> Self {
        Self {
            key,
            value,
            span: Some(span),
            updated: false,
        }
    }

    pub(crate) fn added(key: String, value: MetaValue) -> Self {
        Self {
            key,
            value,
            span: None,
            updated: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &MetaValue {
        &self.value
    }

    /// Whether this entry was added after parsing.
    pub fn is_new(&self) -> bool {
        self.span.is_none()
    }

    /// Whether the value differs from what was parsed, or the entry is new.
    pub fn is_modified(&self) -> bool {
        self.updated || self.is_new()
    }

    pub(crate) fn set_value(&mut self, value: MetaValue) {
        if self.value != value {
            self.value = value;
            self.updated = !self.is_new();
        }
    }
}
