//! A whole `.yara` file: its rules plus the text between them.

use tracing::debug;

use crate::error::{Error, Result};
use crate::parser;
use crate::rule::Rule;

/// Parsed content of one rule file.
///
/// Imports, comments and whitespace between rules are never touched;
/// [`RuleFile::text_formatted`] only re-renders the rules themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFile {
    source: String,
    rules: Vec<Rule>,
}

impl RuleFile {
    /// Parse rule text.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let rules = parser::parse(&source)?;
        debug!(rules = rules.len(), "Parsed rule file");
        Ok(Self { source, rules })
    }

    /// Parse raw file content, which must be UTF-8.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        let source = std::str::from_utf8(bytes).map_err(|e| Error::Encoding(e.to_string()))?;
        Self::parse(source)
    }

    /// Rules in file order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    /// The rule called `name`, if any.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule carries pending metadata edits.
    pub fn is_modified(&self) -> bool {
        self.rules.iter().any(Rule::is_modified)
    }

    /// The text as it was parsed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Serialize the file with every pending edit applied.
    ///
    /// Without edits this returns the parsed text unchanged.
    pub fn text_formatted(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for rule in &self.rules {
            out.push_str(&self.source[cursor..rule.offset]);
            if rule.is_modified() {
                out.push_str(&rule.text());
            } else {
                out.push_str(rule.original_text());
            }
            cursor = rule.offset + rule.original_text().len();
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}
