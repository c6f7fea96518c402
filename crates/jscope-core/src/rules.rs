//! Pluggable lexical rulesets.
//!
//! Scanning layers never hardcode comment or string syntax; they ask a [`LexicalRules`]
//! implementation. [`Ruleset`] is the data-driven implementation loaded from configuration, and
//! [`Ruleset::java`] is the default dialect.

use serde::{Deserialize, Serialize};

/// Lexical classification tables for one language dialect.
pub trait LexicalRules: Send + Sync {
    /// Opener of a comment that runs to the end of the line.
    fn line_comment(&self) -> Option<&str>;

    /// `(open, close)` delimiters of a block comment.
    fn block_comment(&self) -> Option<(&str, &str)>;

    /// Delimiter of a multi-line string literal (e.g. Java text blocks). Checked before the
    /// single-character quotes.
    fn text_block(&self) -> Option<&str>;

    /// Characters that open and close a single-line string or character literal.
    fn is_quote(&self, c: char) -> bool;

    /// Escape character inside string literals.
    fn escape(&self) -> char;

    /// Identifier constituent in general scanning.
    fn is_ident_char(&self, c: char) -> bool;

    /// Identifier constituent inside argument lists and type suffixes, where qualified names
    /// (`java.util.List`), varargs (`String...`) and annotations (`@Nullable`) read as one word.
    fn is_type_ident_char(&self, c: char) -> bool {
        self.is_ident_char(c) || c == '.' || c == '@'
    }
}

/// Serializable [`LexicalRules`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ruleset {
    #[serde(default = "Ruleset::default_line_comment")]
    pub line_comment: Option<String>,
    #[serde(default = "Ruleset::default_block_comment_start")]
    pub block_comment_start: Option<String>,
    #[serde(default = "Ruleset::default_block_comment_end")]
    pub block_comment_end: Option<String>,
    #[serde(default = "Ruleset::default_text_block")]
    pub text_block: Option<String>,
    #[serde(default = "Ruleset::default_quotes")]
    pub quotes: Vec<char>,
    #[serde(default = "Ruleset::default_escape")]
    pub escape: char,
    /// Characters besides alphanumerics and `_` that continue an identifier.
    #[serde(default = "Ruleset::default_extra_ident_chars")]
    pub extra_ident_chars: Vec<char>,
}

impl Ruleset {
    /// Java: `//` and `/* */` comments, `"` and `'` literals, `"""` text blocks, `$` in
    /// identifiers.
    pub fn java() -> Self {
        Self {
            line_comment: Self::default_line_comment(),
            block_comment_start: Self::default_block_comment_start(),
            block_comment_end: Self::default_block_comment_end(),
            text_block: Self::default_text_block(),
            quotes: Self::default_quotes(),
            escape: Self::default_escape(),
            extra_ident_chars: Self::default_extra_ident_chars(),
        }
    }

    fn default_line_comment() -> Option<String> {
        Some("//".to_owned())
    }

    fn default_block_comment_start() -> Option<String> {
        Some("/*".to_owned())
    }

    fn default_block_comment_end() -> Option<String> {
        Some("*/".to_owned())
    }

    fn default_text_block() -> Option<String> {
        Some("\"\"\"".to_owned())
    }

    fn default_quotes() -> Vec<char> {
        vec!['"', '\'']
    }

    fn default_escape() -> char {
        '\\'
    }

    fn default_extra_ident_chars() -> Vec<char> {
        vec!['$']
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::java()
    }
}

impl LexicalRules for Ruleset {
    fn line_comment(&self) -> Option<&str> {
        self.line_comment.as_deref().filter(|s| !s.is_empty())
    }

    fn block_comment(&self) -> Option<(&str, &str)> {
        match (&self.block_comment_start, &self.block_comment_end) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
                Some((start.as_str(), end.as_str()))
            }
            _ => None,
        }
    }

    fn text_block(&self) -> Option<&str> {
        self.text_block.as_deref().filter(|s| !s.is_empty())
    }

    fn is_quote(&self, c: char) -> bool {
        self.quotes.contains(&c)
    }

    fn escape(&self) -> char {
        self.escape
    }

    fn is_ident_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || self.extra_ident_chars.contains(&c)
    }
}
