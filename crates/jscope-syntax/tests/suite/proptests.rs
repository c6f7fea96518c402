use jscope_core::{TextEdit, TextRange, TextSize};
use jscope_syntax::{ScopeSession, ScopeStore};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 128;

/// Lexically self-contained lines: every comment and string closes on its own line.
const FRAGMENTS: &[&str] = &[
    "class A {",
    "public interface Shape<T> extends Base<T> {",
    "enum Color {",
    "void run(int a, String b) throws Exception {",
    "@Override public List<String> names() {",
    "if (ready) {",
    "for (int i = 0; i != n; i++) {",
    "} else {",
    "try {",
    "Runnable r = new Runnable() {",
    "Runnable r = () -> {",
    "int[] xs = { 1, 2, {3, 4} };",
    "// { not a scope",
    "String s = \"{ (\";",
    "/* } */",
    "x = y {",
    "abstract int size();",
    "}",
    "};",
];

fn arb_lines(max: usize) -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..=max)
}

fn join(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

/// Byte offset of the start of line `n` (or the end of the text past the last line).
fn line_start(lines: &[&str], n: usize) -> usize {
    lines.iter().take(n).map(|line| line.len() + 1).sum()
}

fn fresh(text: &str) -> ScopeStore {
    let mut session = ScopeSession::new(text);
    session.resolve_all();
    session.store().clone()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn resolving_twice_changes_nothing(lines in arb_lines(24)) {
        let mut session = ScopeSession::new(join(&lines));
        session.resolve_all();
        let first = session.store().clone();
        session.resolve_all();
        prop_assert_eq!(session.store(), &first);
    }

    #[test]
    fn insertion_matches_fresh_resolve(
        lines in arb_lines(24),
        fragment in prop::sample::select(FRAGMENTS),
        at in any::<prop::sample::Index>(),
    ) {
        let text = join(&lines);
        let mut session = ScopeSession::new(text.as_str());
        session.resolve_all();
        let before = session.store().clone();

        let line = at.index(lines.len() + 1);
        let offset = TextSize::from(line_start(&lines, line) as u32);
        session
            .apply_edit(&TextEdit::insert(offset, format!("{fragment}\n")))
            .unwrap();
        session.resolve_all();

        let kept: Vec<_> = session.store().range(..offset).collect();
        let expected: Vec<_> = before.range(..offset).collect();
        prop_assert_eq!(kept, expected);
        prop_assert_eq!(session.store(), &fresh(session.text()));
    }

    #[test]
    fn line_removal_matches_fresh_resolve(
        lines in arb_lines(24),
        at in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!lines.is_empty());
        let mut session = ScopeSession::new(join(&lines));
        session.resolve_all();

        let line = at.index(lines.len());
        let start = line_start(&lines, line);
        let end = line_start(&lines, line + 1);
        let range = TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32));
        session.apply_edit(&TextEdit::delete(range)).unwrap();
        session.resolve_all();

        prop_assert_eq!(session.store(), &fresh(session.text()));
    }
}
