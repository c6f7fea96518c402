//! Core shared types for jscope.
//!
//! Byte-offset text primitives, text edits, and the lexical ruleset that every scanning layer is
//! parameterized over.

mod edit;
mod rules;
mod text;

pub use edit::{apply_text_edits, normalize_text_edits, EditError, TextEdit};
pub use rules::{LexicalRules, Ruleset};
pub use text::{LineCol, LineIndex, Position, Range, TextRange, TextSize};
