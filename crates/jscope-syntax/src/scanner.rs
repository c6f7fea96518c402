//! Context-filtered scanning primitives.
//!
//! Everything here works on byte offsets over the text of one [`LexicalIndex`] and ignores
//! comments and string literals. Two bracket modes exist: [`Mode::Normal`] pairs `()`, `[]` and
//! `{}` using the index; [`Mode::Angle`] additionally pairs `<>` and treats `.` and `@` as
//! identifier characters. Angle mode is only meaningful inside type positions (argument lists,
//! declaration suffixes, declaration prefixes), where `<` cannot be a comparison.

use regex::Regex;

use crate::lexical::{is_opener, opener_of, LexicalIndex};

/// First window of [`Scanner::search_backward`], in bytes.
const BACKWARD_WINDOW: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Angle,
}

/// A code-context regex match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// What [`Scanner::skip_back_until`] skipped last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skipped {
    /// Nothing yet.
    Start,
    /// A whole string or character literal.
    Literal,
    /// A balanced group; carries the opening character.
    Group(char),
    /// A single character.
    Char(char),
}

impl Skipped {
    /// The last character of the skipped unit, as seen scanning backward.
    pub fn closing_char(self) -> Option<char> {
        match self {
            Skipped::Group('(') => Some(')'),
            Skipped::Group('[') => Some(']'),
            Skipped::Group('{') => Some('}'),
            Skipped::Group('<') => Some('>'),
            Skipped::Char(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Ident,
    Group(char),
    Literal,
    Punct(char),
}

/// One syntactic unit: an identifier run, a balanced group, a literal, or a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    pub kind: UnitKind,
    pub start: usize,
    pub end: usize,
}

pub struct Scanner<'a> {
    index: &'a LexicalIndex<'a>,
    text: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(index: &'a LexicalIndex<'a>) -> Self {
        Self {
            index,
            text: index.text(),
        }
    }

    pub fn index(&self) -> &'a LexicalIndex<'a> {
        self.index
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end]
    }

    pub fn is_ident_char(&self, c: char, mode: Mode) -> bool {
        let rules = self.index.rules();
        match mode {
            Mode::Normal => rules.is_ident_char(c),
            Mode::Angle => rules.is_type_ident_char(c),
        }
    }

    /// `pos` clamped to the text and moved back to the nearest char boundary.
    pub fn floor_char_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    /// Just inside the innermost bracket enclosing `pos`, or the document start.
    pub fn enclosing_bound(&self, pos: usize) -> usize {
        self.index
            .classify(pos)
            .innermost_bracket()
            .map_or(0, |open| open + 1)
    }

    fn char_before(&self, pos: usize) -> Option<(usize, char)> {
        let c = self.text[..pos].chars().next_back()?;
        Some((pos - c.len_utf8(), c))
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text[pos..].chars().next()
    }

    /// Find the `count`-th code match of `re` lying in `[bound, from)`, nearest to `from` first.
    ///
    /// Scans windows ending at `from` that double in size until enough matches are found, so the
    /// cost depends on the distance to the match, not on `bound`.
    pub fn search_backward(
        &self,
        re: &Regex,
        from: usize,
        bound: usize,
        count: usize,
    ) -> Option<Span> {
        if count == 0 || bound >= from {
            return None;
        }
        let mut window = BACKWARD_WINDOW;
        loop {
            let start = self.floor_char_boundary(from.saturating_sub(window)).max(bound);
            let matches = self.code_matches(re, start, from);
            // A match crossing `start` may hide or distort the first one found in the window.
            let usable = if start > bound {
                matches.get(1..).unwrap_or_default()
            } else {
                &matches[..]
            };
            if let Some(idx) = usable.len().checked_sub(count) {
                return Some(usable[idx]);
            }
            if start == bound {
                return None;
            }
            window = window.saturating_mul(2);
        }
    }

    /// Find the `count`-th code match of `re` lying in `[from, bound)`, nearest to `from` first.
    pub fn search_forward(
        &self,
        re: &Regex,
        from: usize,
        bound: usize,
        count: usize,
    ) -> Option<Span> {
        if count == 0 || from >= bound {
            return None;
        }
        let mut seen = 0;
        let hay = &self.text[..bound];
        let mut at = from;
        while at <= hay.len() {
            let m = re.find_at(hay, at)?;
            if self.index.is_code_char(m.start()) {
                seen += 1;
                if seen == count {
                    return Some(Span {
                        start: m.start(),
                        end: m.end(),
                    });
                }
            }
            at = self.next_search_start(m.start(), m.end());
        }
        None
    }

    /// Signed variant: a positive `count` searches backward, a negative one forward.
    pub fn search(&self, re: &Regex, from: usize, bound: Option<usize>, count: isize) -> Option<Span> {
        if count >= 0 {
            self.search_backward(re, from, bound.unwrap_or(0), count.unsigned_abs())
        } else {
            let bound = bound.unwrap_or(self.text.len());
            self.search_forward(re, from, bound, count.unsigned_abs())
        }
    }

    fn code_matches(&self, re: &Regex, start: usize, end: usize) -> Vec<Span> {
        let hay = &self.text[..end];
        let mut out = Vec::new();
        let mut at = start;
        while at <= hay.len() {
            let Some(m) = re.find_at(hay, at) else {
                break;
            };
            if self.index.is_code_char(m.start()) {
                out.push(Span {
                    start: m.start(),
                    end: m.end(),
                });
            }
            at = self.next_search_start(m.start(), m.end());
        }
        out
    }

    fn next_search_start(&self, start: usize, end: usize) -> usize {
        if end > start {
            end
        } else {
            start + self.char_at(start).map_or(1, char::len_utf8)
        }
    }

    /// Move `pos` backward over whitespace and comments, leaving any literal it starts in.
    pub fn skip_trivia_back(&self, pos: usize) -> usize {
        self.skip_trivia_back_to(pos, 0)
    }

    pub fn skip_trivia_back_to(&self, mut pos: usize, bound: usize) -> usize {
        if let Some(region) = self.index.region_at_gap(pos) {
            pos = region.start;
        }
        while pos > bound {
            let Some((at, c)) = self.char_before(pos) else {
                break;
            };
            if c.is_whitespace() {
                pos = at;
                continue;
            }
            match self.index.region_at_char(at) {
                Some(region) if region.kind == crate::lexical::Context::Comment => {
                    pos = region.start;
                }
                _ => break,
            }
        }
        pos.max(bound)
    }

    /// Move `pos` forward over whitespace and comments, not past `limit`.
    pub fn skip_trivia_forward(&self, mut pos: usize, limit: usize) -> usize {
        while pos < limit {
            let Some(c) = self.char_at(pos) else {
                break;
            };
            if c.is_whitespace() {
                pos += c.len_utf8();
                continue;
            }
            match self.index.region_at_char(pos) {
                Some(region) if region.kind == crate::lexical::Context::Comment => {
                    pos = region.end;
                }
                _ => break,
            }
        }
        pos.min(limit)
    }

    /// Walk backward from `from` over trivia, literals, balanced groups and single characters.
    ///
    /// Before every step `stop` sees the kind and start offset of the last skipped unit; the
    /// walk ends when it returns `true` or at the start of the document. Returns the final
    /// offset.
    pub fn skip_back_until(
        &self,
        from: usize,
        mut stop: impl FnMut(Skipped, usize) -> bool,
    ) -> usize {
        let mut pos = from;
        let mut last = (Skipped::Start, from);
        loop {
            if stop(last.0, last.1) {
                return pos;
            }
            pos = self.skip_trivia_back(pos);
            let Some((at, c)) = self.char_before(pos) else {
                return pos;
            };
            last = match self.index.region_at_char(at) {
                Some(region) => (Skipped::Literal, region.start),
                None => match self.group_start(at, Mode::Normal, 0) {
                    Some(open) => (Skipped::Group(self.byte_char(open)), open),
                    None => (Skipped::Char(c), at),
                },
            };
            pos = last.1;
        }
    }

    fn byte_char(&self, at: usize) -> char {
        char::from(self.text.as_bytes()[at])
    }

    fn is_closer(&self, c: char, mode: Mode) -> bool {
        matches!(c, ')' | ']' | '}') || (mode == Mode::Angle && c == '>')
    }

    /// Opening offset of the group whose closer is the character at `close`, not below `limit`.
    pub fn group_start(&self, close: usize, mode: Mode, limit: usize) -> Option<usize> {
        let c = self.char_at(close)?;
        if !self.is_closer(c, mode) || !self.index.is_code_char(close) {
            return None;
        }
        match mode {
            Mode::Normal => self.index.open_of(close).filter(|&open| open >= limit),
            Mode::Angle => self.angle_match_back(close, limit),
        }
    }

    /// Closing offset of the group opened at `open`, below `limit`.
    pub fn group_end(&self, open: usize, mode: Mode, limit: usize) -> Option<usize> {
        let c = self.char_at(open)?;
        let opens = (c.is_ascii() && is_opener(c as u8)) || (mode == Mode::Angle && c == '<');
        if !opens || !self.index.is_code_char(open) {
            return None;
        }
        match mode {
            Mode::Normal => self.index.close_of(open).filter(|&close| close < limit),
            Mode::Angle => self.angle_match_forward(open, limit),
        }
    }

    fn angle_match_back(&self, close: usize, limit: usize) -> Option<usize> {
        let mut stack = vec![self.text.as_bytes()[close]];
        let mut pos = close;
        while pos > limit {
            let (at, c) = self.char_before(pos)?;
            pos = at;
            if let Some(region) = self.index.region_at_char(at) {
                pos = region.start;
                continue;
            }
            let Ok(b) = u8::try_from(c) else {
                continue;
            };
            if b == b';' {
                return None;
            }
            if matches!(b, b')' | b']' | b'}' | b'>') {
                stack.push(b);
            } else if matches!(b, b'(' | b'[' | b'{' | b'<') {
                let top = stack.pop()?;
                if angle_opener_of(top) != b {
                    return None;
                }
                if stack.is_empty() {
                    return (at >= limit).then_some(at);
                }
            }
        }
        None
    }

    fn angle_match_forward(&self, open: usize, limit: usize) -> Option<usize> {
        let mut stack = vec![self.text.as_bytes()[open]];
        let mut pos = open + 1;
        while pos < limit {
            if let Some(region) = self.index.region_at_char(pos) {
                pos = region.end;
                continue;
            }
            let c = self.char_at(pos)?;
            let at = pos;
            pos += c.len_utf8();
            let Ok(b) = u8::try_from(c) else {
                continue;
            };
            if matches!(b, b'(' | b'[' | b'{' | b'<') {
                stack.push(b);
            } else if matches!(b, b')' | b']' | b'}' | b'>') {
                let top = stack.pop()?;
                if angle_opener_of(b) != top {
                    return None;
                }
                if stack.is_empty() {
                    return Some(at);
                }
            }
        }
        None
    }

    /// The unit ending right before `pos` (after skipping trivia), if it starts at or after
    /// `bound`.
    ///
    /// Openers whose group is not closed before `pos` are reported as punctuation; closers whose
    /// opener lies below `bound` end the scan.
    pub fn prev_unit(&self, pos: usize, mode: Mode, bound: usize) -> Option<Unit> {
        let end = self.skip_trivia_back_to(pos, bound);
        if end <= bound {
            return None;
        }
        let (at, c) = self.char_before(end)?;

        if let Some(region) = self.index.region_at_char(at) {
            return (region.start >= bound).then_some(Unit {
                kind: UnitKind::Literal,
                start: region.start,
                end,
            });
        }
        if self.is_closer(c, mode) {
            let open = self.group_start(at, mode, bound)?;
            return Some(Unit {
                kind: UnitKind::Group(self.byte_char(open)),
                start: open,
                end,
            });
        }
        if self.is_ident_char(c, mode) {
            let mut start = at;
            while start > bound {
                match self.char_before(start) {
                    Some((prev, p)) if self.is_ident_char(p, mode) && self.index.is_code_char(prev) => {
                        start = prev
                    }
                    _ => break,
                }
            }
            return Some(Unit {
                kind: UnitKind::Ident,
                start,
                end,
            });
        }
        Some(Unit {
            kind: UnitKind::Punct(c),
            start: at,
            end,
        })
    }

    /// Start of the identifier (in `mode`) that contains or ends at `pos`.
    pub fn ident_start(&self, pos: usize, mode: Mode) -> usize {
        let mut start = pos;
        while let Some((prev, c)) = self.char_before(start) {
            if !self.is_ident_char(c, mode) || !self.index.is_code_char(prev) {
                break;
            }
            start = prev;
        }
        start
    }

    /// Skip forward from `from` over identifiers, angle-mode groups, `,` and `&`.
    ///
    /// Returns `true` when the walk lands exactly on `target`.
    pub fn skips_forward_to(&self, from: usize, target: usize) -> bool {
        let mut pos = from;
        loop {
            pos = self.skip_trivia_forward(pos, target);
            if pos == target {
                return true;
            }
            let Some(c) = self.char_at(pos) else {
                return false;
            };
            if !self.index.is_code_char(pos) {
                return false;
            }
            if self.is_ident_char(c, Mode::Angle) {
                while let Some(c) = self.char_at(pos) {
                    if pos >= target || !self.is_ident_char(c, Mode::Angle) {
                        break;
                    }
                    pos += c.len_utf8();
                }
            } else if matches!(c, '(' | '[' | '<') {
                match self.group_end(pos, Mode::Angle, target) {
                    Some(close) => pos = close + 1,
                    None => return false,
                }
            } else if matches!(c, ',' | '&') {
                pos += 1;
            } else {
                return false;
            }
        }
    }

    /// Start of the declaration whose name contains `pos`: the earliest offset reachable by
    /// walking backward over identifiers, keywords, annotations (with arguments), generic
    /// parameter lists and array dimensions, not below `bound`.
    pub fn declaration_prefix_start(&self, pos: usize, bound: usize) -> usize {
        let pos = self.floor_char_boundary(pos);
        let bound = self.floor_char_boundary(bound);
        let pos = match self.index.region_at_gap(pos) {
            Some(region) => region.start,
            None => pos,
        };
        let mut start = self.ident_start(pos, Mode::Normal).max(bound);
        while let Some(unit) = self.prev_unit(start, Mode::Angle, bound) {
            match unit.kind {
                UnitKind::Ident | UnitKind::Group('<') | UnitKind::Group('[') => start = unit.start,
                UnitKind::Group('(') => match self.prev_unit(unit.start, Mode::Angle, bound) {
                    Some(ann)
                        if ann.kind == UnitKind::Ident
                            && self.text[ann.start..].starts_with('@') =>
                    {
                        start = ann.start
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        start
    }

    /// Text of `[start, end)` with comments dropped and whitespace runs collapsed to one space.
    pub fn normalized_text(&self, start: usize, end: usize) -> String {
        let mut out = String::with_capacity(end.saturating_sub(start));
        let mut pos = start;
        let mut pending_space = false;
        while pos < end {
            if let Some(region) = self.index.region_at_char(pos) {
                if region.kind == crate::lexical::Context::Comment {
                    pending_space = true;
                    pos = region.end;
                    continue;
                }
            }
            let Some(c) = self.char_at(pos) else {
                break;
            };
            pos += c.len_utf8();
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
        out
    }
}

fn angle_opener_of(close: u8) -> u8 {
    match close {
        b'>' => b'<',
        other => opener_of(other).unwrap_or(0),
    }
}
