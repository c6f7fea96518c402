//! Scope detectors.
//!
//! A detector looks at the text around one code-context `{` and either classifies it or
//! declines. [`DetectorChain`] runs detectors in order; the first acceptance wins. Detectors never
//! fail loudly: an unbalanced bracket, a missing identifier or an argument list that does not
//! parse is a decline.

use jscope_config::ScopeConfig;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::arglist::parse_arg_list;
use crate::scanner::{Mode, Scanner, Skipped, Span, UnitKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Class,
    Interface,
    Enum,
    AnonClass,
    Method,
    /// A block introduced by a bare keyword (`else {`, `try {`) or a lambda arrow.
    SimpleStatement,
    /// A block introduced by `keyword (…) {`.
    Statement,
    Array,
}

impl ScopeKind {
    /// Class, interface, enum or anonymous class body.
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            ScopeKind::Class | ScopeKind::Interface | ScopeKind::Enum | ScopeKind::AnonClass
        )
    }
}

/// A detector's classification of one brace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub kind: ScopeKind,
    pub name: String,
    pub declaration_start: Option<usize>,
}

impl Detection {
    fn new(kind: ScopeKind, name: impl Into<String>, declaration_start: Option<usize>) -> Self {
        Self {
            kind,
            name: name.into(),
            declaration_start,
        }
    }
}

/// Everything a detector may look at.
pub struct DetectCx<'a> {
    pub scanner: &'a Scanner<'a>,
    pub config: &'a ScopeConfig,
}

pub trait ScopeDetector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Classify the `{` at `brace`, or decline with `None`.
    fn detect(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection>;
}

/// Ordered list of detectors.
pub struct DetectorChain {
    detectors: Vec<Box<dyn ScopeDetector>>,
}

impl DetectorChain {
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Array, anonymous class, class-like, simple statement, method-or-statement.
    pub fn default_chain() -> Self {
        let mut chain = Self::empty();
        chain.push(ArrayDetector);
        chain.push(AnonClassDetector);
        chain.push(ClassLikeDetector);
        chain.push(SimpleStatementDetector);
        chain.push(MethodOrStatementDetector);
        chain
    }

    /// Append a detector; it runs after every detector already in the chain.
    pub fn push(&mut self, detector: impl ScopeDetector + 'static) {
        self.detectors.push(Box::new(detector));
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.detectors.iter().map(|detector| detector.name())
    }

    pub fn classify(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection> {
        self.detectors.iter().find_map(|detector| {
            let detection = detector.detect(cx, brace)?;
            tracing::trace!(
                target: "jscope.syntax",
                brace,
                detector = detector.name(),
                kind = ?detection.kind,
                name = %detection.name,
                "brace classified"
            );
            Some(detection)
        })
    }
}

impl Default for DetectorChain {
    fn default() -> Self {
        Self::default_chain()
    }
}

static TYPE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:class|interface|enum)\b").expect("valid regex"));
static TYPE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:extends|implements|permits)\b").expect("valid regex"));
static THROWS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bthrows\b").expect("valid regex"));
static CLOSE_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)").expect("valid regex"));
static DECLARATION_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;{})]").expect("valid regex"));

/// The nearest `re` match in `[bound, target)` whose clause, skipped forward, ends exactly at
/// `target`.
fn find_decl_suffix(sc: &Scanner<'_>, re: &Regex, target: usize, bound: usize) -> Option<Span> {
    (1..)
        .map_while(|count| sc.search_backward(re, target, bound, count))
        .find(|found| sc.skips_forward_to(found.end, target))
}

/// `{` right after `,`, `]` or another configured character.
pub struct ArrayDetector;

impl ScopeDetector for ArrayDetector {
    fn name(&self) -> &'static str {
        "array"
    }

    fn detect(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection> {
        let mut previous = Skipped::Start;
        cx.scanner.skip_back_until(brace, |kind, _| {
            previous = kind;
            kind != Skipped::Start
        });
        let c = previous.closing_char()?;
        cx.config
            .array_predecessors
            .contains(&c)
            .then(|| Detection::new(ScopeKind::Array, "", None))
    }
}

/// `new Type(args) {`.
pub struct AnonClassDetector;

impl ScopeDetector for AnonClassDetector {
    fn name(&self) -> &'static str {
        "anon-class"
    }

    fn detect(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection> {
        let sc = cx.scanner;
        let args = sc.prev_unit(brace, Mode::Normal, 0)?;
        if args.kind != UnitKind::Group('(') {
            return None;
        }
        let mut ty = sc.prev_unit(args.start, Mode::Angle, 0)?;
        if ty.kind == UnitKind::Group('<') {
            ty = sc.prev_unit(ty.start, Mode::Angle, 0)?;
        }
        if ty.kind != UnitKind::Ident {
            return None;
        }
        let new = sc.prev_unit(ty.start, Mode::Normal, 0)?;
        if new.kind != UnitKind::Ident || sc.slice(new.start, new.end) != "new" {
            return None;
        }
        let name = format!("<anon>{}", sc.slice(ty.start, ty.end));
        Some(Detection::new(ScopeKind::AnonClass, name, Some(new.start)))
    }
}

/// `class Name … {`, `interface Name … {`, `@interface Name {` and `enum Name … {`.
pub struct ClassLikeDetector;

impl ScopeDetector for ClassLikeDetector {
    fn name(&self) -> &'static str {
        "class-like"
    }

    fn detect(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection> {
        let sc = cx.scanner;
        let enclosing = sc.enclosing_bound(brace);
        let bound = sc
            .search_backward(&DECLARATION_BOUNDARY, brace, enclosing, 1)
            .map_or(enclosing, |found| found.end);
        let keyword = sc.search_backward(&TYPE_KEYWORD, brace, bound, 1)?;
        // `Foo.class`
        if sc.text()[..keyword.start].ends_with('.') {
            return None;
        }

        let mut end = brace;
        while let Some(suffix) = find_decl_suffix(sc, &TYPE_SUFFIX, end, keyword.end) {
            end = suffix.start;
        }
        let args = parse_arg_list(sc, keyword.end, end, true).ok()?;
        let [arg] = args.as_slice() else {
            return None;
        };
        let name = arg.ty.split('<').next().unwrap_or_default().trim_end();
        if name.is_empty() {
            return None;
        }

        let kind = match sc.slice(keyword.start, keyword.end) {
            "class" => ScopeKind::Class,
            "interface" => ScopeKind::Interface,
            _ => ScopeKind::Enum,
        };
        let start = sc.declaration_prefix_start(keyword.start, 0);
        Some(Detection::new(kind, name, Some(start)))
    }
}

/// `-> {` and `keyword {`.
pub struct SimpleStatementDetector;

impl ScopeDetector for SimpleStatementDetector {
    fn name(&self) -> &'static str {
        "simple-statement"
    }

    fn detect(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection> {
        let sc = cx.scanner;
        let unit = sc.prev_unit(brace, Mode::Normal, 0)?;
        match unit.kind {
            UnitKind::Punct('>') if sc.text()[..unit.start].ends_with('-') => Some(Detection::new(
                ScopeKind::SimpleStatement,
                "lambda",
                Some(unit.start - 1),
            )),
            UnitKind::Ident => {
                let word = sc.slice(unit.start, unit.end);
                cx.config.is_statement_keyword(word).then(|| {
                    Detection::new(ScopeKind::SimpleStatement, word, Some(unit.start))
                })
            }
            _ => None,
        }
    }
}

/// `name(params) [throws …] {` and `keyword (…) {`.
pub struct MethodOrStatementDetector;

impl MethodOrStatementDetector {
    /// Classify the declaration terminated at `terminator`, which is either its body `{` or,
    /// for abstract and interface methods, its `;`.
    pub fn detect_at(cx: &DetectCx<'_>, terminator: usize) -> Option<Detection> {
        let sc = cx.scanner;
        let mut params = sc.prev_unit(terminator, Mode::Normal, 0)?;
        let mut throws = false;
        if params.kind != UnitKind::Group('(') {
            let bound = sc.enclosing_bound(terminator);
            let paren = sc.search_backward(&CLOSE_PAREN, terminator, bound, 1)?;
            let keyword = find_decl_suffix(sc, &THROWS, terminator, paren.end)?;
            let thrown = parse_arg_list(sc, keyword.end, terminator, true).ok()?;
            if thrown.is_empty() {
                return None;
            }
            throws = true;
            params = sc.prev_unit(keyword.start, Mode::Normal, 0)?;
            if params.kind != UnitKind::Group('(') {
                return None;
            }
        }

        let ident = sc.prev_unit(params.start, Mode::Normal, 0)?;
        if ident.kind != UnitKind::Ident {
            return None;
        }
        let word = sc.slice(ident.start, ident.end);
        if !throws && cx.config.is_statement_keyword(word) {
            return Some(Detection::new(ScopeKind::Statement, word, Some(ident.start)));
        }

        let args = parse_arg_list(sc, params.start + 1, params.end - 1, false).ok()?;
        let types: Vec<&str> = args.iter().map(|arg| arg.ty.as_str()).collect();
        let name = format!("{word}({})", types.join(","));
        let start = sc.declaration_prefix_start(ident.start, 0);
        Some(Detection::new(ScopeKind::Method, name, Some(start)))
    }
}

impl ScopeDetector for MethodOrStatementDetector {
    fn name(&self) -> &'static str {
        "method-or-statement"
    }

    fn detect(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection> {
        Self::detect_at(cx, brace)
    }
}
