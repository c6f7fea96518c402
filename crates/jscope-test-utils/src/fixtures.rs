use jscope_core::{TextRange, TextSize};

const CURSOR: &str = "$0";
const START: &str = "/*start*/";
const END: &str = "/*end*/";

/// Strips the single `$0` marker from `fixture` and returns its offset.
pub fn extract_offset(fixture: &str) -> (String, TextSize) {
    let (text, offsets) = extract_offsets(fixture);
    assert_eq!(
        offsets.len(),
        1,
        "fixture must contain exactly one {CURSOR} marker"
    );
    (text, offsets[0])
}

/// Strips every `$0` marker from `fixture` and returns their offsets in the stripped text.
pub fn extract_offsets(fixture: &str) -> (String, Vec<TextSize>) {
    let mut text = String::with_capacity(fixture.len());
    let mut offsets = Vec::new();
    let mut rest = fixture;
    while let Some(at) = rest.find(CURSOR) {
        text.push_str(&rest[..at]);
        offsets.push(TextSize::from(text.len() as u32));
        rest = &rest[at + CURSOR.len()..];
    }
    text.push_str(rest);
    (text, offsets)
}

/// Extracts a byte range delimited by `/*start*/` and `/*end*/`.
///
/// Returns the fixture with markers removed and the range in that text.
pub fn extract_range(fixture: &str) -> (String, TextRange) {
    let start = fixture
        .find(START)
        .expect("fixture missing /*start*/ marker");
    let after_start = start + START.len();
    let end = fixture.find(END).expect("fixture missing /*end*/ marker");
    assert!(end >= after_start, "/*end*/ must come after /*start*/");

    let mut text = String::with_capacity(fixture.len());
    text.push_str(&fixture[..start]);
    text.push_str(&fixture[after_start..end]);
    text.push_str(&fixture[end + END.len()..]);

    let range = TextRange::new(
        TextSize::from(start as u32),
        TextSize::from((end - START.len()) as u32),
    );
    (text, range)
}

/// Offset of the first occurrence of `needle` in `text`.
#[track_caller]
pub fn offset_of(text: &str, needle: &str) -> TextSize {
    let at = text
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in fixture"));
    TextSize::from(at as u32)
}

/// Offset of the `n`-th (zero-based) `{` in `text`, counting every occurrence.
#[track_caller]
pub fn nth_brace(text: &str, n: usize) -> TextSize {
    let at = text
        .match_indices('{')
        .nth(n)
        .map(|(at, _)| at)
        .unwrap_or_else(|| panic!("fixture has fewer than {} braces", n + 1));
    TextSize::from(at as u32)
}
