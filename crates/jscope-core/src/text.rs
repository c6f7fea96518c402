//! Text model primitives: sizes, ranges, line tables and UTF-16 positions.

pub use text_size::{TextRange, TextSize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// LSP-compatible position (UTF-16 code units).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// LSP-compatible range (UTF-16 code units).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Line table for one text snapshot.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line. Line ends exclude the terminator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    starts: Vec<TextSize>,
    ends: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![TextSize::from(0)];
        let mut ends = Vec::new();

        let mut i = 0;
        while i < bytes.len() {
            let terminator = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
                b'\n' | b'\r' => 1,
                _ => 0,
            };
            if terminator == 0 {
                i += 1;
                continue;
            }
            ends.push(TextSize::from(i as u32));
            i += terminator;
            starts.push(TextSize::from(i as u32));
        }
        let len = TextSize::from(text.len() as u32);
        ends.push(len);

        Self { starts, ends, len }
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.len
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }

    /// Zero-based line containing `offset` (clamped to the text length).
    pub fn line_of(&self, offset: TextSize) -> u32 {
        let offset = offset.min(self.len);
        match self.starts.binary_search(&offset) {
            Ok(line) => line as u32,
            Err(next) => next.saturating_sub(1) as u32,
        }
    }

    #[inline]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.starts.get(line as usize).copied()
    }

    #[inline]
    pub fn line_end(&self, line: u32) -> Option<TextSize> {
        self.ends.get(line as usize).copied()
    }

    /// The full line (without terminator) containing `offset`.
    pub fn line_range_of(&self, offset: TextSize) -> TextRange {
        let line = self.line_of(offset) as usize;
        TextRange::new(self.starts[line], self.ends[line])
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        let start = self.starts[line as usize];
        let end = self.ends[line as usize];
        LineCol {
            line,
            col: u32::from(offset.min(end) - start),
        }
    }

    /// Convert an LSP position into a byte offset, clamping columns past the line end and
    /// columns that split a surrogate pair to the nearest preceding character boundary.
    ///
    /// Lines past the end map to the end of the text.
    pub fn offset_of_position(&self, text: &str, position: Position) -> TextSize {
        debug_assert_eq!(TextSize::of(text), self.len);
        let (Some(start), Some(end)) = (self.line_start(position.line), self.line_end(position.line))
        else {
            return self.len;
        };

        let line = &text[usize::from(start)..usize::from(end)];
        let mut utf16 = 0u32;
        for (idx, ch) in line.char_indices() {
            let width = ch.len_utf16() as u32;
            if utf16 + width > position.character {
                return start + TextSize::from(idx as u32);
            }
            utf16 += width;
        }
        end
    }

    /// Convert a byte offset into an LSP position.
    pub fn position(&self, text: &str, offset: TextSize) -> Position {
        debug_assert_eq!(TextSize::of(text), self.len);
        let line = self.line_of(offset);
        let start = self.starts[line as usize];
        let end = offset.min(self.ends[line as usize]);
        let character = text[usize::from(start)..usize::from(end)]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();
        Position { line, character }
    }
}
