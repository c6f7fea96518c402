//! Queries answered from the resolved scope structure.

use std::ops::RangeBounds;

use jscope_core::{TextRange, TextSize};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::detect::{DetectCx, MethodOrStatementDetector, ScopeKind};
use crate::lexical::LexicalIndex;
use crate::scanner::Scanner;
use crate::session::{to_size, ScopeSession};
use crate::store::{Scope, ScopeStore};

static PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bpackage\s+([\w$]+(?:\s*\.\s*[\w$]+)*)\s*;").expect("valid regex")
});
static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bimport\s+(static\s+)?([\w$]+(?:\s*\.\s*(?:[\w$]+|\*))*)\s*;")
        .expect("valid regex")
});
static ABSTRACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\babstract\b").expect("valid regex"));
static MEMBER_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;{}]").expect("valid regex"));
static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(r";").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Normal,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Dotted path without whitespace, e.g. `java.util.List` or `java.util.*`.
    pub path: String,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports {
    /// From the start of the first import line to the end of the last one.
    pub region: Option<TextRange>,
    pub entries: Vec<ImportEntry>,
}

/// An owned copy of a scope and (a filtered view of) its ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedScope {
    pub kind: ScopeKind,
    pub name: String,
    pub declaration_start: Option<TextSize>,
    pub open_brace: TextSize,
    pub parent: Option<Box<DetachedScope>>,
}

impl DetachedScope {
    /// Copy `scope` and the ancestors for which `keep` holds; others are spliced out of the
    /// chain.
    pub(crate) fn detach(store: &ScopeStore, scope: &Scope, keep: &dyn Fn(&Scope) -> bool) -> Self {
        let kept: Vec<&Scope> = store
            .ancestors(scope.open_brace)
            .filter(|ancestor| keep(*ancestor))
            .collect();
        let parent = kept.into_iter().rev().fold(None, |parent, ancestor| {
            Some(Box::new(Self::single(ancestor, parent)))
        });
        Self::single(scope, parent)
    }

    fn single(scope: &Scope, parent: Option<Box<DetachedScope>>) -> Self {
        Self {
            kind: scope.kind,
            name: scope.name.clone(),
            declaration_start: scope.declaration_start,
            open_brace: scope.open_brace,
            parent,
        }
    }

    /// Ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &DetachedScope> + '_ {
        let mut cursor = self.parent.as_deref();
        std::iter::from_fn(move || {
            let scope = cursor?;
            cursor = scope.parent.as_deref();
            Some(scope)
        })
    }
}

/// Whitespace-free text of a dotted name capture.
fn dotted(caps: &Captures<'_>, group: usize) -> String {
    caps.get(group)
        .map(|m| m.as_str().split_whitespace().collect())
        .unwrap_or_default()
}

fn top_level<'t>(
    index: &'t LexicalIndex<'t>,
    re: &'static Regex,
) -> impl Iterator<Item = Captures<'t>> + 't {
    re.captures_iter(index.text()).filter(move |caps| {
        let start = caps.get(0).map_or(0, |m| m.start());
        index.is_code_char(start) && index.classify(start).brackets.is_empty()
    })
}

impl ScopeSession {
    /// The first top-level `package` declaration.
    pub fn package(&mut self) -> Option<String> {
        self.resolve_all();
        let index = LexicalIndex::build(self.text(), self.rules());
        let package = top_level(&index, &PACKAGE)
            .next()
            .map(|caps| dotted(&caps, 1));
        package
    }

    /// Top-level `import` declarations in document order.
    pub fn imports(&mut self) -> Imports {
        self.resolve_all();
        let index = LexicalIndex::build(self.text(), self.rules());
        let lines = self.document().line_index();

        let mut imports = Imports::default();
        let mut first = None;
        let mut last = None;
        for caps in top_level(&index, &IMPORT) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            first.get_or_insert(whole.start());
            last = Some(whole.end());
            let kind = if caps.get(1).is_some() {
                ImportKind::Static
            } else {
                ImportKind::Normal
            };
            imports.entries.push(ImportEntry {
                path: dotted(&caps, 2),
                kind,
            });
        }
        if let (Some(first), Some(last)) = (first, last) {
            imports.region = Some(TextRange::new(
                lines.line_range_of(to_size(first)).start(),
                lines.line_range_of(to_size(last)).end(),
            ));
        }
        imports
    }

    /// Copies of the cached scopes whose brace lies in `range` and satisfies `scope_pred`.
    ///
    /// Each copy's ancestor chain only contains ancestors satisfying `ancestor_pred`.
    pub fn all_scopes(
        &mut self,
        range: impl RangeBounds<TextSize>,
        scope_pred: impl Fn(&Scope) -> bool,
        ancestor_pred: impl Fn(&Scope) -> bool,
    ) -> Vec<DetachedScope> {
        self.resolve_all();
        let store = self.store();
        store
            .range(range)
            .filter_map(|(_, annotation)| annotation.as_scope())
            .filter(|scope| scope_pred(*scope))
            .map(|scope| DetachedScope::detach(store, scope, &ancestor_pred))
            .collect()
    }

    /// Start of the declaration whose name contains `offset`, not earlier than `bound`.
    pub fn declaration_prefix_start(&mut self, offset: TextSize, bound: Option<TextSize>) -> TextSize {
        self.resolve_all();
        let index = LexicalIndex::build(self.text(), self.rules());
        let scanner = Scanner::new(&index);
        let bound = bound.map_or(0, usize::from);
        to_size(scanner.declaration_prefix_start(usize::from(offset), bound))
    }

    /// Body-less methods declared `abstract` directly inside class, enum and anonymous class
    /// bodies, in document order.
    pub fn class_abstract_methods(&mut self) -> Vec<Scope> {
        self.resolve_all();
        let text = self.text();
        let index = LexicalIndex::build(text, self.rules());
        let scanner = Scanner::new(&index);
        let cx = DetectCx {
            scanner: &scanner,
            config: self.scope_config(),
        };

        let mut methods = Vec::new();
        let classes = self
            .store()
            .scopes()
            .filter(|scope| scope.kind.is_class_like() && scope.kind != ScopeKind::Interface);
        for class in classes {
            let open = usize::from(class.open_brace);
            let body_end = index.close_of(open).unwrap_or(text.len());
            let mut at = open + 1;
            while let Some(keyword) = scanner.search_forward(&ABSTRACT, at, body_end, 1) {
                at = keyword.end;
                if index.classify(keyword.start).innermost_bracket() != Some(open) {
                    continue;
                }
                let Some(end) = scanner.search_forward(&MEMBER_END, keyword.end, body_end, 1) else {
                    break;
                };
                if &text[end.start..end.end] != ";" {
                    continue;
                }
                methods.extend(body_less_method(&cx, end.start, class));
            }
        }
        methods
    }

    /// Body-less methods declared directly inside `interface`'s body, in document order.
    pub fn interface_abstract_methods(&mut self, interface: &Scope) -> Vec<Scope> {
        if interface.kind != ScopeKind::Interface {
            return Vec::new();
        }
        self.resolve_all();
        let text = self.text();
        let index = LexicalIndex::build(text, self.rules());
        let scanner = Scanner::new(&index);
        let cx = DetectCx {
            scanner: &scanner,
            config: self.scope_config(),
        };

        let open = usize::from(interface.open_brace);
        if text.as_bytes().get(open) != Some(&b'{') {
            return Vec::new();
        }
        let body_end = index.close_of(open).unwrap_or(text.len());
        let mut methods = Vec::new();
        let mut at = open + 1;
        while let Some(semicolon) = scanner.search_forward(&SEMICOLON, at, body_end, 1) {
            at = semicolon.end;
            if index.classify(semicolon.start).innermost_bracket() == Some(open) {
                methods.extend(body_less_method(&cx, semicolon.start, interface));
            }
        }
        methods
    }
}

fn body_less_method(cx: &DetectCx<'_>, terminator: usize, owner: &Scope) -> Option<Scope> {
    let detection = MethodOrStatementDetector::detect_at(cx, terminator)?;
    (detection.kind == ScopeKind::Method).then(|| Scope {
        kind: ScopeKind::Method,
        name: detection.name,
        declaration_start: detection.declaration_start.map(to_size),
        open_brace: to_size(terminator),
        parent: Some(owner.open_brace),
    })
}
