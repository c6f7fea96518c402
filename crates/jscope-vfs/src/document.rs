use std::sync::Arc;

use jscope_core::{LineIndex, Position, Range, TextEdit, TextRange, TextSize};
use thiserror::Error;

use crate::{ContentChange, EditListener};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("invalid edit range {range:?} for document of length {len:?}")]
    InvalidRange { range: TextRange, len: TextSize },
    #[error("offset {0:?} is not a UTF-8 character boundary")]
    NotCharBoundary(TextSize),
}

/// An in-memory, byte-addressable document with versioning and incremental edits.
#[derive(Debug, Clone)]
pub struct Document {
    text: Arc<String>,
    version: i32,
    lines: LineIndex,
}

impl Document {
    pub fn new(text: impl Into<String>, version: i32) -> Self {
        let text = text.into();
        let lines = LineIndex::new(&text);
        Self {
            text: Arc::new(text),
            version,
            lines,
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn text_arc(&self) -> Arc<String> {
        Arc::clone(&self.text)
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    /// Character at byte offset `offset`, if it starts a character.
    pub fn char_at(&self, offset: TextSize) -> Option<char> {
        self.text.get(usize::from(offset)..)?.chars().next()
    }

    /// Apply a byte-offset edit and notify `listener`.
    pub fn apply_edit(
        &mut self,
        edit: &TextEdit,
        listener: &mut dyn EditListener,
    ) -> Result<(), DocumentError> {
        let len = self.len();
        if edit.range.end() > len {
            return Err(DocumentError::InvalidRange {
                range: edit.range,
                len,
            });
        }
        for offset in [edit.range.start(), edit.range.end()] {
            if !self.text.is_char_boundary(usize::from(offset)) {
                return Err(DocumentError::NotCharBoundary(offset));
            }
        }

        let text = Arc::make_mut(&mut self.text);
        text.replace_range(std::ops::Range::<usize>::from(edit.range), &edit.replacement);
        self.lines = LineIndex::new(text);

        tracing::trace!(
            target: "jscope.vfs",
            start = u32::from(edit.range.start()),
            removed = u32::from(edit.range.len()),
            inserted = edit.replacement.len(),
            "applied edit"
        );
        listener.text_changed(edit.earliest_changed());
        Ok(())
    }

    /// Applies a sequence of LSP changes in order and returns the normalized byte edits.
    pub fn apply_changes(
        &mut self,
        new_version: i32,
        changes: &[ContentChange],
        listener: &mut dyn EditListener,
    ) -> Result<Vec<TextEdit>, DocumentError> {
        let mut edits = Vec::with_capacity(changes.len());
        for change in changes {
            let edit = self.to_text_edit(change);
            self.apply_edit(&edit, listener)?;
            edits.push(edit);
        }
        self.version = new_version;
        Ok(edits)
    }

    fn to_text_edit(&self, change: &ContentChange) -> TextEdit {
        let range = match change.range {
            Some(range) => range,
            None => Range::new(Position::new(0, 0), self.end_position()),
        };
        let start = self.lines.offset_of_position(&self.text, range.start);
        let end = self.lines.offset_of_position(&self.text, range.end);
        TextEdit::new(TextRange::new(start.min(end), end.max(start)), change.text.clone())
    }

    fn end_position(&self) -> Position {
        self.lines.position(&self.text, self.len())
    }
}
