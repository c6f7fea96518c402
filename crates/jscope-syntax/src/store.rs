//! Position-keyed scope annotations and the dirty watermark.

use std::collections::BTreeMap;
use std::ops::RangeBounds;

use jscope_core::TextSize;
use jscope_vfs::EditListener;

use crate::detect::ScopeKind;

/// A resolved scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
    /// Where the declaring keyword or prefix (annotations, modifiers, return type) begins.
    pub declaration_start: Option<TextSize>,
    /// The opening `{`; for body-less methods, the terminating `;`.
    pub open_brace: TextSize,
    /// `open_brace` of the enclosing resolved scope.
    pub parent: Option<TextSize>,
}

/// What the store knows about one brace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Scope(Scope),
    /// Scanned, but no detector matched (or an enclosing brace is unknown).
    Unknown,
}

impl Annotation {
    pub fn as_scope(&self) -> Option<&Scope> {
        match self {
            Annotation::Scope(scope) => Some(scope),
            Annotation::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Annotation::Unknown)
    }
}

/// Earliest position whose annotations may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watermark {
    /// Never resolved.
    Uninitialized,
    /// Every annotation is current.
    Clean,
    /// Everything at or after the offset must be re-resolved.
    Dirty(TextSize),
}

impl Watermark {
    /// Move the watermark down to `offset`. Never raises it, and has no effect before the first
    /// resolve.
    pub fn lower(&mut self, offset: TextSize) {
        *self = match *self {
            Watermark::Uninitialized => Watermark::Uninitialized,
            Watermark::Clean => Watermark::Dirty(offset),
            Watermark::Dirty(current) => Watermark::Dirty(current.min(offset)),
        };
    }

    /// First offset that needs resolving, or `None` when clean.
    pub fn dirty_from(self) -> Option<TextSize> {
        match self {
            Watermark::Uninitialized => Some(TextSize::from(0)),
            Watermark::Clean => None,
            Watermark::Dirty(offset) => Some(offset),
        }
    }
}

impl EditListener for Watermark {
    fn text_changed(&mut self, earliest: TextSize) {
        self.lower(earliest);
    }
}

/// Sparse map from brace offset to [`Annotation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeStore {
    entries: BTreeMap<TextSize, Annotation>,
}

impl ScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, brace: TextSize) -> Option<&Annotation> {
        self.entries.get(&brace)
    }

    pub fn get_mut(&mut self, brace: TextSize) -> Option<&mut Annotation> {
        self.entries.get_mut(&brace)
    }

    pub fn scope(&self, brace: TextSize) -> Option<&Scope> {
        self.get(brace).and_then(Annotation::as_scope)
    }

    pub fn insert(&mut self, brace: TextSize, annotation: Annotation) {
        self.entries.insert(brace, annotation);
    }

    /// Drop every entry at or after `from`.
    pub fn clear_from(&mut self, from: TextSize) {
        self.entries.split_off(&from);
    }

    pub fn range(
        &self,
        range: impl RangeBounds<TextSize>,
    ) -> impl DoubleEndedIterator<Item = (TextSize, &Annotation)> + '_ {
        self.entries.range(range).map(|(&brace, annotation)| (brace, annotation))
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> + '_ {
        self.entries.values().filter_map(Annotation::as_scope)
    }

    pub fn unknown_count(&self) -> usize {
        self.entries.values().filter(|a| a.is_unknown()).count()
    }

    /// Parent chain of the scope at `brace`, innermost first (excluding the scope itself).
    pub fn ancestors(&self, brace: TextSize) -> impl Iterator<Item = &Scope> + '_ {
        let mut cursor = self.scope(brace).and_then(|scope| scope.parent);
        std::iter::from_fn(move || {
            let scope = self.scope(cursor?)?;
            cursor = scope.parent;
            Some(scope)
        })
    }
}
