use jscope_core::{Position, Range, TextEdit, TextRange, TextSize};
use jscope_syntax::{
    Annotation, DetectCx, Detection, ScopeDetector, ScopeKind, ScopeSession, Watermark,
};
use jscope_test_utils::{nth_brace, offset_of};
use jscope_vfs::{ContentChange, NoopListener};
use pretty_assertions::assert_eq;

const SOURCE: &str = "class A {\n  void first() { }\n  void second(int x) { if (x) { } }\n}\n";

fn names(session: &ScopeSession) -> Vec<String> {
    session
        .store()
        .scopes()
        .map(|scope| scope.name.clone())
        .collect()
}

#[test]
fn renaming_a_method_only_touches_later_scopes() {
    let mut session = ScopeSession::new(SOURCE);
    session.resolve_all();
    let at = offset_of(SOURCE, "second");
    let before: Vec<_> = session
        .store()
        .range(..at)
        .map(|(brace, a)| (brace, a.clone()))
        .collect();

    session
        .apply_edit(&TextEdit::new(
            TextRange::at(at, TextSize::of("second")),
            "renamed",
        ))
        .unwrap();
    assert_eq!(session.watermark(), Watermark::Dirty(at));
    // Braces after the edit are unresolved until the next query, not stale.
    assert!(session.store().range(at..).next().is_none());
    assert_eq!(session.store().len(), 2);

    session.resolve_all();
    let after: Vec<_> = session
        .store()
        .range(..at)
        .map(|(brace, a)| (brace, a.clone()))
        .collect();
    assert_eq!(before, after);
    assert_eq!(names(&session), vec!["A", "first()", "renamed(int)", "if"]);
}

#[test]
fn opening_a_block_comment_hides_later_braces() {
    let mut session = ScopeSession::new(SOURCE);
    session.resolve_all();
    assert_eq!(session.store().len(), 4);

    let at = offset_of(SOURCE, "  void second");
    session.apply_edit(&TextEdit::insert(at, "/*")).unwrap();
    session.resolve_all();
    assert_eq!(names(&session), vec!["A", "first()"]);

    let end = TextSize::of(session.text());
    session.apply_edit(&TextEdit::insert(end, "*/")).unwrap();
    session.resolve_all();
    assert_eq!(names(&session), vec!["A", "first()"]);

    session
        .apply_edit(&TextEdit::delete(TextRange::at(at, TextSize::from(2))))
        .unwrap();
    session.resolve_all();
    assert_eq!(names(&session), vec!["A", "first()", "second(int)", "if"]);
}

#[test]
fn lsp_changes_lower_the_watermark_to_the_earliest_change() {
    let mut session = ScopeSession::new(SOURCE);
    session.resolve_all();

    let changes = [
        ContentChange::replace(
            Range::new(Position::new(2, 7), Position::new(2, 13)),
            "later",
        ),
        ContentChange::replace(
            Range::new(Position::new(1, 7), Position::new(1, 12)),
            "early",
        ),
    ];
    let edits = session.apply_changes(2, &changes).unwrap();
    assert_eq!(edits.len(), 2);
    assert_eq!(session.document().version(), 2);
    assert_eq!(session.watermark(), Watermark::Dirty(offset_of(SOURCE, "first")));

    session.resolve_all();
    assert_eq!(names(&session), vec!["A", "early()", "later(int)", "if"]);
}

#[test]
fn synthetic_edits_with_the_observer_suspended() {
    let mut session = ScopeSession::new(SOURCE);
    session.resolve_all();
    let before = session.store().clone();

    let at = offset_of(SOURCE, "first");
    session.with_observer_suspended(|doc| {
        let edit = TextEdit::insert(at, "tmp_");
        doc.apply_edit(&edit, &mut NoopListener).unwrap();
        doc.apply_edit(&TextEdit::delete(TextRange::at(at, TextSize::of("tmp_"))), &mut NoopListener)
            .unwrap();
    });
    assert_eq!(session.text(), SOURCE);
    assert_eq!(session.watermark(), Watermark::Clean);
    session.resolve_all();
    assert_eq!(session.store(), &before);

    // Observation resumes afterwards.
    session.apply_edit(&TextEdit::insert(at, "x")).unwrap();
    assert_eq!(session.watermark(), Watermark::Dirty(at));
}

struct EnumConstantBody;

impl ScopeDetector for EnumConstantBody {
    fn name(&self) -> &'static str {
        "enum-constant"
    }

    fn detect(&self, cx: &DetectCx<'_>, brace: usize) -> Option<Detection> {
        let text = cx.scanner.text()[..brace].trim_end();
        let name: String = text
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_uppercase())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        (!name.is_empty()).then(|| Detection {
            kind: ScopeKind::AnonClass,
            name,
            declaration_start: None,
        })
    }
}

#[test]
fn detectors_pushed_later_apply_after_invalidation() {
    let text = "enum Op { PLUS { int apply(int a, int b) { return a + b; } } }";
    let mut session = ScopeSession::new(text);
    session.resolve_all();
    assert!(session.store().get(nth_brace(text, 1)).unwrap().is_unknown());
    assert!(session.store().get(nth_brace(text, 2)).unwrap().is_unknown());

    session.detectors_mut().push(EnumConstantBody);
    session.resolve_all();
    assert!(session.store().get(nth_brace(text, 1)).unwrap().is_unknown());

    session.invalidate_from(TextSize::from(0));
    let plus = session
        .scope_at(nth_brace(text, 1))
        .and_then(Annotation::as_scope)
        .cloned()
        .unwrap();
    assert_eq!(plus.name, "PLUS");
    let apply = session.store().scope(nth_brace(text, 2)).unwrap();
    assert_eq!(apply.name, "apply(int,int)");
    assert_eq!(apply.parent, Some(plus.open_brace));
}
