use jscope_core::TextSize;
use jscope_syntax::{Annotation, ScopeKind, ScopeSession};
use jscope_test_utils::{nth_brace, offset_of};
use pretty_assertions::assert_eq;

fn resolved(text: &str) -> ScopeSession {
    let mut session = ScopeSession::new(text);
    session.resolve_all();
    session
}

fn kinds_and_names(session: &ScopeSession) -> Vec<(ScopeKind, String)> {
    session
        .store()
        .scopes()
        .map(|scope| (scope.kind, scope.name.clone()))
        .collect()
}

#[test]
fn method_with_throws_clause() {
    let text = "void foo(int a, String b) throws Exception { }";
    let mut session = ScopeSession::new(text);
    let scope = session
        .scope_at(nth_brace(text, 0))
        .and_then(Annotation::as_scope)
        .cloned()
        .unwrap();
    assert_eq!(scope.kind, ScopeKind::Method);
    assert_eq!(scope.name, "foo(int,String)");
    assert_eq!(scope.declaration_start, Some(TextSize::from(0)));
    assert_eq!(scope.parent, None);
}

#[test]
fn nested_classes_form_the_ancestor_chain() {
    let mut session = ScopeSession::new("class A { class B { void m() { } } }");
    let methods = session.all_scopes(
        ..,
        |scope| scope.kind == ScopeKind::Method,
        |scope| scope.kind.is_class_like(),
    );
    assert_eq!(methods.len(), 1);
    let chain: Vec<&str> = methods[0].ancestors().map(|s| s.name.as_str()).collect();
    assert_eq!(chain, vec!["B", "A"]);
}

#[test]
fn braces_in_comments_and_strings_are_ignored() {
    let text = "String s = \"{ not a scope\";\n// {\n/* { */\nchar c = '{';\nvoid m() { }";
    let session = resolved(text);
    assert_eq!(session.store().len(), 1);
    assert_eq!(
        kinds_and_names(&session),
        vec![(ScopeKind::Method, "m()".to_string())]
    );
}

#[test]
fn anonymous_class_contains_its_method() {
    let text = "Runnable r = new Runnable() { public void run() { } };";
    let session = resolved(text);
    let anon = session.store().scope(nth_brace(text, 0)).unwrap();
    assert_eq!(anon.kind, ScopeKind::AnonClass);
    assert_eq!(anon.name, "<anon>Runnable");
    assert_eq!(anon.declaration_start, Some(offset_of(text, "new")));

    let run = session.store().scope(nth_brace(text, 1)).unwrap();
    assert_eq!(run.kind, ScopeKind::Method);
    assert_eq!(run.name, "run()");
    assert_eq!(run.parent, Some(anon.open_brace));
}

#[test]
fn nested_array_initializer_is_an_array() {
    let text = "int[] a = { 1, 2, {3, 4} };";
    let session = resolved(text);
    let inner = session.store().scope(nth_brace(text, 1)).unwrap();
    assert_eq!(inner.kind, ScopeKind::Array);
    assert_eq!(inner.name, "");
    assert_eq!(inner.declaration_start, None);
    assert_eq!(inner.parent, Some(nth_brace(text, 0)));
}

#[test]
fn unknown_ancestor_poisons_every_descendant() {
    let text = "class A { x = y { void m() { if (c) { } } } void ok() { } }";
    let session = resolved(text);
    let store = session.store();

    assert!(store.get(nth_brace(text, 1)).unwrap().is_unknown());
    assert!(store.get(nth_brace(text, 2)).unwrap().is_unknown());
    assert!(store.get(nth_brace(text, 3)).unwrap().is_unknown());

    let ok = store.scope(nth_brace(text, 4)).unwrap();
    assert_eq!(ok.name, "ok()");
    assert_eq!(ok.parent, Some(nth_brace(text, 0)));
}

#[test]
fn statement_blocks() {
    let text = "void m() {\n  if (a) { } else { }\n  while (b) { }\n  try { } catch (E e) { } finally { }\n  synchronized (this) { }\n  Runnable r = () -> { };\n  static_call();\n}";
    let session = resolved(text);
    assert_eq!(
        kinds_and_names(&session),
        vec![
            (ScopeKind::Method, "m()".to_string()),
            (ScopeKind::Statement, "if".to_string()),
            (ScopeKind::SimpleStatement, "else".to_string()),
            (ScopeKind::Statement, "while".to_string()),
            (ScopeKind::SimpleStatement, "try".to_string()),
            (ScopeKind::Statement, "catch".to_string()),
            (ScopeKind::SimpleStatement, "finally".to_string()),
            (ScopeKind::Statement, "synchronized".to_string()),
            (ScopeKind::SimpleStatement, "lambda".to_string()),
        ]
    );
    let method = nth_brace(text, 0);
    assert!(session.store().scopes().skip(1).all(|s| s.parent == Some(method)));
}

#[test]
fn type_declarations() {
    let text = "package p;\n\n@Retention(RUNTIME)\npublic @interface Marker { }\n\npublic sealed interface Shape permits Circle, Square { }\n\nfinal class Circle implements Shape, Comparable<Circle> {\n  enum Unit { CM, MM }\n  static { init(); }\n}";
    let session = resolved(text);
    assert_eq!(
        kinds_and_names(&session),
        vec![
            (ScopeKind::Interface, "Marker".to_string()),
            (ScopeKind::Interface, "Shape".to_string()),
            (ScopeKind::Class, "Circle".to_string()),
            (ScopeKind::Enum, "Unit".to_string()),
            (ScopeKind::SimpleStatement, "static".to_string()),
        ]
    );
    let marker = session.store().scope(nth_brace(text, 0)).unwrap();
    assert_eq!(marker.declaration_start, Some(offset_of(text, "@Retention")));
}

#[test]
fn resolving_twice_is_idempotent() {
    let text = "class A { void m() { new Thread(() -> { }) { }; } }";
    let mut session = resolved(text);
    let first = session.store().clone();
    session.resolve_all();
    assert_eq!(session.store(), &first);
}
