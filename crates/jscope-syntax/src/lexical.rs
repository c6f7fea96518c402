//! Lexical context analysis.
//!
//! [`classify`] is a pure function of `(text, rules, position)`: it lexes forward from the start
//! of the document and reports whether `position` is in code, a comment or a string literal,
//! together with the stack of enclosing open brackets. [`LexicalIndex`] answers the same
//! question for arbitrary positions after a single forward pass; it is built once per resolve
//! pass and dropped with it.
//!
//! Offsets are byte offsets. A position denotes the gap *before* the byte at that offset.

use std::collections::HashMap;

use jscope_core::LexicalRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Code,
    Comment,
    String,
}

/// A comment or string literal. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub kind: Context,
    pub start: usize,
    pub end: usize,
    /// `false` when the region runs into the end of the document.
    pub terminated: bool,
}

impl Region {
    /// Whether the gap `pos` lies inside this region.
    fn contains_gap(&self, pos: usize) -> bool {
        self.start < pos && (pos < self.end || (pos == self.end && !self.terminated))
    }

    /// Whether the character starting at `offset` belongs to this region.
    fn contains_char(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Lexical state at one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexState {
    pub context: Context,
    /// Start of the comment or string containing the position.
    pub literal_start: Option<usize>,
    /// Offsets of the enclosing open brackets, outermost first.
    pub brackets: Vec<usize>,
}

impl LexState {
    pub fn is_code(&self) -> bool {
        self.context == Context::Code
    }

    /// `pos` moved out of an enclosing comment or string to its start.
    pub fn code_start(&self, pos: usize) -> usize {
        self.literal_start.unwrap_or(pos)
    }

    pub fn innermost_bracket(&self) -> Option<usize> {
        self.brackets.last().copied()
    }
}

pub(crate) fn opener_of(close: u8) -> Option<u8> {
    match close {
        b')' => Some(b'('),
        b']' => Some(b'['),
        b'}' => Some(b'{'),
        _ => None,
    }
}

pub(crate) fn is_opener(b: u8) -> bool {
    matches!(b, b'(' | b'[' | b'{')
}

enum Event {
    Open(usize),
    Close(usize),
    Region(Region),
}

/// Forward lexer producing bracket and opaque-region events in document order.
struct Lexer<'a> {
    text: &'a str,
    rules: &'a dyn LexicalRules,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, rules: &'a dyn LexicalRules) -> Self {
        Self {
            text,
            rules,
            pos: 0,
        }
    }

    /// Offset of the first `delim` at or after `from` that is not escaped, or `None`.
    fn find_closing(&self, from: usize, delim: &str, stop_at_newline: bool) -> Option<usize> {
        let escape = self.rules.escape();
        let mut chars = self.text[from..].char_indices();
        while let Some((rel, c)) = chars.next() {
            let at = from + rel;
            if c == escape {
                chars.next();
                continue;
            }
            if stop_at_newline && (c == '\n' || c == '\r') {
                return None;
            }
            if self.text[at..].starts_with(delim) {
                return Some(at);
            }
        }
        None
    }

    fn line_end(&self, from: usize) -> usize {
        self.text[from..]
            .find(['\n', '\r'])
            .map_or(self.text.len(), |rel| from + rel)
    }

    fn region(&mut self, kind: Context, start: usize, end: usize, terminated: bool) -> Event {
        self.pos = end;
        Event::Region(Region {
            kind,
            start,
            end,
            terminated,
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let text = self.text;
        while self.pos < text.len() {
            let start = self.pos;
            let rest = &text[start..];

            if let Some(open) = self.rules.line_comment() {
                if rest.starts_with(open) {
                    let end = self.line_end(start);
                    return Some(self.region(Context::Comment, start, end, true));
                }
            }
            if let Some((open, close)) = self.rules.block_comment() {
                if rest.starts_with(open) {
                    let body = start + open.len();
                    let event = match text[body..].find(close) {
                        Some(rel) => {
                            self.region(Context::Comment, start, body + rel + close.len(), true)
                        }
                        None => self.region(Context::Comment, start, text.len(), false),
                    };
                    return Some(event);
                }
            }
            if let Some(delim) = self.rules.text_block() {
                if rest.starts_with(delim) {
                    let body = start + delim.len();
                    let event = match self.find_closing(body, delim, false) {
                        Some(at) => self.region(Context::String, start, at + delim.len(), true),
                        None => self.region(Context::String, start, text.len(), false),
                    };
                    return Some(event);
                }
            }

            let Some(c) = rest.chars().next() else {
                break;
            };
            if self.rules.is_quote(c) {
                let body = start + c.len_utf8();
                let mut quote = [0u8; 4];
                let quote: &str = c.encode_utf8(&mut quote);
                // Unterminated literals stop at the end of their line so a half-typed string does
                // not swallow the rest of the document.
                let event = match self.find_closing(body, quote, true) {
                    Some(at) => self.region(Context::String, start, at + quote.len(), true),
                    None => {
                        let end = self.line_end(body);
                        self.region(Context::String, start, end, end < text.len())
                    }
                };
                return Some(event);
            }

            self.pos += c.len_utf8();
            let b = rest.as_bytes()[0];
            if is_opener(b) {
                return Some(Event::Open(start));
            }
            if opener_of(b).is_some() {
                return Some(Event::Close(start));
            }
        }
        None
    }
}

/// Classify `pos` by lexing `text` from the beginning.
pub fn classify(text: &str, rules: &dyn LexicalRules, pos: usize) -> LexState {
    let pos = pos.min(text.len());
    let mut brackets: Vec<usize> = Vec::new();

    for event in Lexer::new(text, rules) {
        match event {
            Event::Open(at) if at < pos => brackets.push(at),
            Event::Close(at) if at < pos => {
                // Mismatched closers still pop.
                brackets.pop();
            }
            Event::Region(region) if region.start < pos => {
                if region.contains_gap(pos) {
                    return LexState {
                        context: region.kind,
                        literal_start: Some(region.start),
                        brackets,
                    };
                }
            }
            _ => break,
        }
    }

    LexState {
        context: Context::Code,
        literal_start: None,
        brackets,
    }
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    open: usize,
    /// Offset of the closer that popped this bracket, if any.
    close: Option<usize>,
    /// Whether that closer has the matching type.
    matched: bool,
    /// Index (into `brackets`) of the enclosing bracket.
    parent: Option<usize>,
}

/// Per-pass lexical cache: opaque regions and bracket structure of one text snapshot.
pub struct LexicalIndex<'a> {
    text: &'a str,
    rules: &'a dyn LexicalRules,
    regions: Vec<Region>,
    /// Sorted by `open`.
    brackets: Vec<Bracket>,
    /// Closer offset -> index of the bracket it matched.
    closers: HashMap<usize, usize>,
}

impl<'a> LexicalIndex<'a> {
    pub fn build(text: &'a str, rules: &'a dyn LexicalRules) -> Self {
        let bytes = text.as_bytes();
        let mut regions = Vec::new();
        let mut brackets: Vec<Bracket> = Vec::new();
        let mut closers = HashMap::new();
        let mut stack: Vec<usize> = Vec::new();

        for event in Lexer::new(text, rules) {
            match event {
                Event::Region(region) => regions.push(region),
                Event::Open(at) => {
                    brackets.push(Bracket {
                        open: at,
                        close: None,
                        matched: false,
                        parent: stack.last().copied(),
                    });
                    stack.push(brackets.len() - 1);
                }
                Event::Close(at) => {
                    let Some(idx) = stack.pop() else {
                        continue;
                    };
                    let bracket = &mut brackets[idx];
                    bracket.close = Some(at);
                    bracket.matched = opener_of(bytes[at]) == Some(bytes[bracket.open]);
                    if bracket.matched {
                        closers.insert(at, idx);
                    }
                }
            }
        }

        Self {
            text,
            rules,
            regions,
            brackets,
            closers,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn rules(&self) -> &'a dyn LexicalRules {
        self.rules
    }

    fn region_before(&self, pos: usize) -> Option<&Region> {
        let idx = self.regions.partition_point(|r| r.start < pos);
        idx.checked_sub(1).map(|idx| &self.regions[idx])
    }

    /// The comment or string whose characters include `offset`.
    pub fn region_at_char(&self, offset: usize) -> Option<&Region> {
        self.region_before(offset + 1)
            .filter(|region| region.contains_char(offset))
    }

    /// The comment or string containing the gap `pos`.
    pub fn region_at_gap(&self, pos: usize) -> Option<&Region> {
        self.region_before(pos)
            .filter(|region| region.contains_gap(pos))
    }

    /// Whether the character starting at `offset` is code.
    pub fn is_code_char(&self, offset: usize) -> bool {
        self.region_at_char(offset).is_none()
    }

    fn bracket_index(&self, open: usize) -> Option<usize> {
        self.brackets
            .binary_search_by_key(&open, |b| b.open)
            .ok()
    }

    /// Index of the innermost bracket enclosing the gap `pos`.
    fn innermost_index(&self, pos: usize) -> Option<usize> {
        let mut candidate = self
            .brackets
            .partition_point(|b| b.open < pos)
            .checked_sub(1);
        while let Some(idx) = candidate {
            let bracket = &self.brackets[idx];
            if bracket.close.map_or(true, |close| close >= pos) {
                return Some(idx);
            }
            candidate = bracket.parent;
        }
        None
    }

    /// Same result as [`classify`] for the indexed text.
    pub fn classify(&self, pos: usize) -> LexState {
        let pos = pos.min(self.text.len());
        let (context, literal_start) = match self.region_at_gap(pos) {
            Some(region) => (region.kind, Some(region.start)),
            None => (Context::Code, None),
        };
        let mut brackets = Vec::new();
        let mut cursor = self.innermost_index(pos);
        while let Some(idx) = cursor {
            brackets.push(self.brackets[idx].open);
            cursor = self.brackets[idx].parent;
        }
        brackets.reverse();
        LexState {
            context,
            literal_start,
            brackets,
        }
    }

    /// Open brackets enclosing the bracket opened at `open`, innermost first.
    pub fn ancestors(&self, open: usize) -> impl Iterator<Item = usize> + '_ {
        let mut cursor = self
            .bracket_index(open)
            .and_then(|idx| self.brackets[idx].parent);
        std::iter::from_fn(move || {
            let idx = cursor?;
            cursor = self.brackets[idx].parent;
            Some(self.brackets[idx].open)
        })
    }

    /// The bracket directly enclosing the one opened at `open`.
    pub fn parent_of(&self, open: usize) -> Option<usize> {
        self.ancestors(open).next()
    }

    /// Matching closer of the bracket opened at `open`.
    pub fn close_of(&self, open: usize) -> Option<usize> {
        let bracket = &self.brackets[self.bracket_index(open)?];
        bracket.close.filter(|_| bracket.matched)
    }

    /// Matching opener of the closer at `close`.
    pub fn open_of(&self, close: usize) -> Option<usize> {
        self.closers
            .get(&close)
            .map(|&idx| self.brackets[idx].open)
    }

    /// Code `{` offsets at or after `from`, ascending.
    pub fn open_braces_from(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        let start = self.brackets.partition_point(|b| b.open < from);
        self.brackets[start..]
            .iter()
            .map(|b| b.open)
            .filter(|&open| self.text.as_bytes()[open] == b'{')
    }

    /// Enclosing `{` brackets of `pos`, innermost first.
    pub fn enclosing_braces(&self, pos: usize) -> Vec<usize> {
        let mut out = self.classify(pos).brackets;
        out.retain(|&open| self.text.as_bytes()[open] == b'{');
        out.reverse();
        out
    }
}
