//! Tokenizer for YARA rule text.
//!
//! The lexer is permissive: hex strings, conditions and string
//! modifiers come out as a flat stream of identifiers, numbers and
//! punctuation. Only the constructs that can hide braces or section
//! keywords (comments, text strings, regular expressions) are recognized
//! precisely.

use std::ops::Range;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Ident,
    /// A double-quoted text string, quotes included in the span
    Str,
    /// Anything starting with a digit, e.g. `10`, `0x4D`, `2KB`
    Number,
    /// A `/.../flags` regular expression
    Regex,
    /// Any other single character
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }

    pub fn is_ident(&self, source: &str, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(source) == word
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

/// Split `source` into tokens, skipping whitespace and comments.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];

        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if b == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            pos = source[pos..].find('\n').map_or(bytes.len(), |n| pos + n);
            continue;
        }

        if b == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            let end = source[pos + 2..]
                .find("*/")
                .ok_or_else(|| Error::parse_at(source, pos, "unterminated block comment"))?;
            pos = pos + 2 + end + 2;
            continue;
        }

        let start = pos;
        let kind = match b {
            b'"' => {
                pos = scan_delimited(source, pos, b'"', "unterminated string")?;
                TokenKind::Str
            }
            b'/' if regex_allowed(source, tokens.last()) => {
                pos = scan_delimited(source, pos, b'/', "unterminated regular expression")?;
                while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
                    pos += 1;
                }
                TokenKind::Regex
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
                TokenKind::Ident
            }
            b if b.is_ascii_digit() => {
                while pos < bytes.len() {
                    let c = bytes[pos];
                    let fractional = c == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit);
                    if c.is_ascii_alphanumeric() || c == b'_' || fractional {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                TokenKind::Number
            }
            _ => {
                let c = source[pos..].chars().next().unwrap_or('\0');
                pos += c.len_utf8().max(1);
                TokenKind::Punct(c)
            }
        };

        tokens.push(Token {
            kind,
            span: start..pos,
        });
    }

    Ok(tokens)
}

/// A `/` opens a regular expression after `=`, `matches`, or where a
/// function argument starts (`(` and `,`); anywhere else it is division.
fn regex_allowed(source: &str, previous: Option<&Token>) -> bool {
    previous.is_some_and(|t| {
        t.is_punct('=') || t.is_punct('(') || t.is_punct(',') || t.is_ident(source, "matches")
    })
}

/// Scan from an opening delimiter at `start` to just past its unescaped
/// closing twin on the same line.
fn scan_delimited(source: &str, start: usize, delimiter: u8, message: &str) -> Result<usize> {
    let bytes = source.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' => break,
            c if c == delimiter => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(Error::parse_at(source, start, message))
}

/// Decode the body of a text string token (quotes included).
pub fn unescape(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hex: String = chars.clone().take(2).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) if hex.len() == 2 => {
                        out.push(char::from(byte));
                        chars.nth(1);
                    }
                    _ => out.push_str("\\x"),
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Encode `value` as a double-quoted YARA text string.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
