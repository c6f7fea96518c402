//! Byte-offset text edits.

use std::fmt;

use crate::{TextRange, TextSize};

/// Replace `range` (half-open, byte offsets) with `replacement`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    /// First byte whose content (or position) differs after this edit is applied.
    #[inline]
    pub fn earliest_changed(&self) -> TextSize {
        self.range.start()
    }

    /// Signed change in text length.
    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - usize::from(self.range.len()) as isize
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EditError {
    RangeOutOfBounds { range: TextRange, text_len: TextSize },
    InvalidUtf8Boundary { offset: TextSize },
    OverlappingEdits { first: TextRange, second: TextRange },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::RangeOutOfBounds { range, text_len } => write!(
                f,
                "edit range {range:?} is out of bounds for text length {text_len:?}"
            ),
            EditError::InvalidUtf8Boundary { offset } => {
                write!(f, "offset {offset:?} is not a UTF-8 character boundary")
            }
            EditError::OverlappingEdits { first, second } => {
                write!(f, "overlapping edits: {first:?} overlaps {second:?}")
            }
        }
    }
}

impl std::error::Error for EditError {}

/// Sort `edits` by position and reject out-of-bounds, non-boundary or overlapping ranges.
pub fn normalize_text_edits(text: &str, edits: &mut [TextEdit]) -> Result<(), EditError> {
    edits.sort_by_key(|e| (e.range.start(), e.range.end()));
    let text_len = TextSize::of(text);

    for edit in edits.iter() {
        if edit.range.end() > text_len {
            return Err(EditError::RangeOutOfBounds {
                range: edit.range,
                text_len,
            });
        }
        for offset in [edit.range.start(), edit.range.end()] {
            if !text.is_char_boundary(usize::from(offset)) {
                return Err(EditError::InvalidUtf8Boundary { offset });
            }
        }
    }

    for pair in edits.windows(2) {
        let (first, second) = (pair[0].range, pair[1].range);
        let both_inserts_at_same_offset =
            first.is_empty() && second.is_empty() && first.start() == second.start();
        if first.end() > second.start() || both_inserts_at_same_offset {
            return Err(EditError::OverlappingEdits { first, second });
        }
    }
    Ok(())
}

/// Apply a batch of non-overlapping edits, back to front.
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut edits = edits.to_vec();
    normalize_text_edits(text, &mut edits)?;

    let mut out = text.to_string();
    for edit in edits.iter().rev() {
        out.replace_range(std::ops::Range::<usize>::from(edit.range), &edit.replacement);
    }
    Ok(out)
}
