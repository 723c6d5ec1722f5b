//! Structural parser: rule boundaries, names, tags and `meta:` entries.

use std::collections::HashSet;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::lexer::{self, Token, TokenKind};
use crate::meta::{Meta, MetaValue};
use crate::rule::{MetaInsertion, Rule};

const SECTIONS: [&str; 3] = ["meta", "strings", "condition"];
const DEFAULT_SECTION_INDENT: &str = "  ";

/// Parse every rule in `source`.
pub(crate) fn parse(source: &str) -> Result<Vec<Rule>> {
    let tokens = lexer::tokenize(source)?;
    Parser {
        source,
        tokens,
        pos: 0,
        newline: line_ending(source),
    }
    .parse_file()
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    newline: &'static str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::parse_at(self.source, offset, message)
    }

    /// Error pointing at the next token, or at end of input.
    fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(token) => self.error_at(
                token.span.start,
                format!("expected {expected}, found `{}`", self.text(token)),
            ),
            None => self.error_at(
                self.source.len(),
                format!("expected {expected}, found end of file"),
            ),
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<Token> {
        if self.peek().is_some_and(|t| t.kind == TokenKind::Ident)
            && let Some(token) = self.bump()
        {
            return Ok(token);
        }
        Err(self.unexpected(expected))
    }

    fn expect_punct(&mut self, c: char, expected: &str) -> Result<Token> {
        if self.peek().is_some_and(|t| t.is_punct(c))
            && let Some(token) = self.bump()
        {
            return Ok(token);
        }
        Err(self.unexpected(expected))
    }

    /// A section keyword followed by `:` at the current position.
    fn at_section_header(&self) -> bool {
        match (self.peek(), self.peek_nth(1)) {
            (Some(keyword), Some(colon)) => {
                keyword.kind == TokenKind::Ident
                    && SECTIONS.contains(&self.text(keyword))
                    && colon.is_punct(':')
            }
            _ => false,
        }
    }

    fn parse_file(mut self) -> Result<Vec<Rule>> {
        let mut rules = Vec::new();
        let mut names = HashSet::new();

        while let Some(token) = self.peek() {
            let word = if token.kind == TokenKind::Ident {
                self.text(token)
            } else {
                ""
            };

            match word {
                "import" | "include" => {
                    self.bump();
                    match self.peek() {
                        Some(path) if path.kind == TokenKind::Str => {
                            self.bump();
                        }
                        _ => return Err(self.unexpected("a quoted path")),
                    }
                }
                "private" | "global" | "rule" => {
                    let rule = self.parse_rule()?;
                    if !names.insert(rule.name.clone()) {
                        return Err(self.error_at(
                            rule.offset,
                            format!("duplicate rule `{}`", rule.name),
                        ));
                    }
                    rules.push(rule);
                }
                _ => return Err(self.unexpected("`rule`, `import` or `include`")),
            }
        }

        Ok(rules)
    }

    fn parse_rule(&mut self) -> Result<Rule> {
        let start = self.peek().map_or(self.source.len(), |t| t.span.start);

        let mut modifiers = Vec::new();
        while let Some(token) = self.peek() {
            let word = self.text(token);
            if token.kind == TokenKind::Ident && (word == "private" || word == "global") {
                modifiers.push(word.to_string());
                self.bump();
            } else {
                break;
            }
        }

        let keyword = self.expect_ident("`rule`")?;
        if self.text(&keyword) != "rule" {
            return Err(self.error_at(
                keyword.span.start,
                format!("expected `rule`, found `{}`", self.text(&keyword)),
            ));
        }

        let name_token = self.expect_ident("a rule name")?;
        let name = self.text(&name_token).to_string();

        let mut tags = Vec::new();
        if self.peek().is_some_and(|t| t.is_punct(':')) {
            self.bump();
            while let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Ident) {
                tags.push(self.text(token).to_string());
                self.bump();
            }
            if tags.is_empty() {
                return Err(self.unexpected("a tag"));
            }
        }

        let open = self.expect_punct('{', "`{`")?;

        let mut depth = 1usize;
        let mut current: Option<&str> = None;
        let mut seen_sections: Vec<&str> = Vec::new();
        let mut first_section: Option<usize> = None;
        let mut meta_header: Option<(usize, usize)> = None;
        let mut metas: Vec<(usize, Meta)> = Vec::new();
        let mut condition_tokens = 0usize;

        let close = loop {
            if depth == 1
                && self.at_section_header()
                && let (Some(keyword), Some(colon)) = (self.bump(), self.bump())
            {
                let section = SECTIONS
                    .into_iter()
                    .find(|s| *s == keyword.text(self.source))
                    .unwrap_or("condition");

                if seen_sections.contains(&section) {
                    return Err(self.error_at(
                        keyword.span.start,
                        format!("duplicate `{section}` section in rule `{name}`"),
                    ));
                }
                seen_sections.push(section);
                first_section.get_or_insert(keyword.span.start);
                current = Some(section);

                if section == "meta" {
                    meta_header = Some((keyword.span.start, colon.span.end));
                    self.parse_meta_entries(&mut metas)?;
                }
                continue;
            }

            let Some(token) = self.bump() else {
                return Err(self.error_at(
                    start,
                    format!("rule `{name}` is missing its closing `}}`"),
                ));
            };

            if token.is_punct('}') {
                depth -= 1;
                if depth == 0 {
                    break token;
                }
            } else if token.is_punct('{') {
                depth += 1;
            }

            match current {
                None => {
                    return Err(self.error_at(
                        token.span.start,
                        format!(
                            "expected `meta:`, `strings:` or `condition:`, found `{}`",
                            self.text(&token)
                        ),
                    ));
                }
                Some("condition") => condition_tokens += 1,
                Some(_) => {}
            }
        };

        if !seen_sections.contains(&"condition") {
            return Err(self.error_at(
                close.span.start,
                format!("rule `{name}` has no condition"),
            ));
        }
        if condition_tokens == 0 {
            return Err(self.error_at(
                close.span.start,
                format!("rule `{name}` has an empty condition"),
            ));
        }

        let insertion = match (meta_header, metas.last()) {
            (Some(_), Some((key_start, last))) => MetaInsertion::AfterEntry {
                at: last.span.as_ref().map_or(open.span.end, |s| s.end) - start,
                indent: self
                    .line_indent(*key_start)
                    .unwrap_or_else(|| DEFAULT_SECTION_INDENT.repeat(2)),
            },
            (Some((header_start, colon_end)), None) => MetaInsertion::IntoSection {
                at: colon_end - start,
                indent: self
                    .line_indent(header_start)
                    .map(|i| format!("{i}{DEFAULT_SECTION_INDENT}"))
                    .unwrap_or_else(|| DEFAULT_SECTION_INDENT.repeat(2)),
            },
            (None, _) => {
                let section_start = first_section.unwrap_or(close.span.start);
                let indent = self.line_indent(section_start);
                let header_indent = indent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SECTION_INDENT.to_string());
                MetaInsertion::NewSection {
                    at: open.span.end - start,
                    entry_indent: format!("{header_indent}{DEFAULT_SECTION_INDENT}"),
                    header_indent,
                    trailing: if indent.is_some() { "" } else { self.newline },
                }
            }
        };

        Ok(Rule {
            offset: start,
            name,
            tags,
            modifiers,
            source: self.source[start..close.span.end].to_string(),
            metas: metas
                .into_iter()
                .map(|(_, meta)| relocate(meta, start))
                .collect(),
            insertion,
            newline: self.newline,
        })
    }

    /// Parse `key = value` entries until the next section or the rule end.
    ///
    /// Entries are returned with the absolute offset of their key and an
    /// absolute value span.
    fn parse_meta_entries(&mut self, metas: &mut Vec<(usize, Meta)>) -> Result<()> {
        while let Some(token) = self.peek() {
            if token.is_punct('}') || self.at_section_header() {
                break;
            }

            let key = self.expect_ident("a metadata key")?;
            self.expect_punct('=', "`=`")?;
            let (value, span) = self.parse_meta_value()?;
            metas.push((
                key.span.start,
                Meta::parsed(self.text(&key).to_string(), value, span),
            ));
        }
        Ok(())
    }

    fn parse_meta_value(&mut self) -> Result<(MetaValue, Range<usize>)> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("a metadata value"));
        };
        let text = self.text(&token);

        let parsed = match token.kind {
            TokenKind::Str => Some((MetaValue::String(lexer::unescape(text)), token.span.clone())),
            TokenKind::Number => parse_integer(text).map(|n| (MetaValue::Integer(n), token.span.clone())),
            TokenKind::Ident if text == "true" || text == "false" => {
                Some((MetaValue::Boolean(text == "true"), token.span.clone()))
            }
            TokenKind::Punct('-') => match self.peek_nth(1) {
                Some(number) if number.kind == TokenKind::Number => parse_integer(self.text(number))
                    .map(|n| (MetaValue::Integer(-n), token.span.start..number.span.end)),
                _ => None,
            },
            _ => None,
        };

        let Some((value, span)) = parsed else {
            return Err(self.unexpected("a string, integer or boolean metadata value"));
        };

        let consumed = if token.is_punct('-') { 2 } else { 1 };
        self.pos += consumed;
        Ok((value, span))
    }

    /// Whitespace before `offset` when nothing else precedes it on its line.
    fn line_indent(&self, offset: usize) -> Option<String> {
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &self.source[line_start..offset];
        prefix
            .chars()
            .all(|c| c == ' ' || c == '\t')
            .then(|| prefix.to_string())
    }
}

/// Line ending of the first line, `\n` for single-line input.
fn line_ending(source: &str) -> &'static str {
    match source.find('\n') {
        Some(i) if source[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

fn relocate(mut meta: Meta, rule_start: usize) -> Meta {
    meta.span = meta
        .span
        .map(|span| span.start - rule_start..span.end - rule_start);
    meta
}

fn parse_integer(text: &str) -> Option<i64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
