use std::time::{Duration, Instant};

use jscope_syntax::ScopeSession;

fn class_with_methods(methods: usize) -> String {
    let mut out = String::from("package scaling;\n\npublic class Big {\n");
    for i in 0..methods {
        out.push_str(&format!(
            "  int method{i}(int x) throws Exception {{\n    if (x > {i}) {{ return x; }}\n    return {i};\n  }}\n"
        ));
    }
    out.push_str("}\n");
    out
}

fn resolve_time(text: &str) -> Duration {
    let mut session = ScopeSession::new(text);
    let started = Instant::now();
    session.resolve_all();
    let elapsed = started.elapsed();
    assert!(!session.store().is_empty());
    elapsed
}

#[test]
fn full_resolve_grows_linearly_with_document_size() {
    let small = class_with_methods(500);
    let large = class_with_methods(4000);
    // Warm up allocations and regex caches.
    resolve_time(&small);

    let small_time = resolve_time(&small).max(Duration::from_millis(2));
    let large_time = resolve_time(&large);
    // Eight times the text: linear work stays near 8x, per-brace rescans of the prefix would
    // approach 64x.
    assert!(
        large_time < small_time * 24,
        "resolve of 8x the text took {large_time:?} vs {small_time:?}"
    );
}
