use jscope_config::JscopeConfig;
use jscope_syntax::{ScopeKind, ScopeSession};
use jscope_test_utils::nth_brace;

#[test]
fn array_predecessors_come_from_config() {
    let text = "int[] a = { 1, 2 };";

    let mut session = ScopeSession::new(text);
    let brace = nth_brace(text, 0);
    let kind = session
        .scope_at(brace)
        .and_then(|a| a.as_scope())
        .map(|s| s.kind);
    assert_eq!(kind, Some(ScopeKind::Array));

    let config = JscopeConfig::load_from_str("[scopes]\narray_predecessors = [\",\", \"]\"]\n").unwrap();
    let mut session = ScopeSession::with_config(text, &config);
    assert!(session.scope_at(brace).unwrap().is_unknown());
}

#[test]
fn statement_keywords_come_from_config() {
    let text = "void m() { unless (x) { } }";
    let config = JscopeConfig::load_from_str(
        "[scopes]\nstatement_keywords = [\"if\", \"unless\"]\n",
    )
    .unwrap();
    let mut session = ScopeSession::with_config(text, &config);
    let inner = session.scope_at(nth_brace(text, 1)).unwrap().as_scope().cloned().unwrap();
    assert_eq!(inner.kind, ScopeKind::Statement);
    assert_eq!(inner.name, "unless");

    // Without the keyword `unless (x)` reads as a method with an unnamed parameter.
    let mut default = ScopeSession::new(text);
    assert!(default.scope_at(nth_brace(text, 1)).unwrap().is_unknown());
}

#[test]
fn lexical_rules_come_from_config() {
    let text = "# {\nvoid m() { }";
    let config = JscopeConfig::load_from_str("[lexical]\nline_comment = \"#\"\n").unwrap();
    let mut session = ScopeSession::with_config(text, &config);
    let scopes = session.all_scopes(.., |_| true, |_| true);
    assert_eq!(scopes.len(), 1);
    assert_eq!(scopes[0].name, "m()");
}
