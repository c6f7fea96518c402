//! Utilities shared by jscope tests.
//!
//! Fixtures are plain Java snippets with inline markers:
//! - `$0` marks a single offset (a cursor);
//! - `/*start*/` and `/*end*/` delimit a range.
//!
//! Markers are stripped before the text is handed to the code under test.

mod fixtures;

pub use fixtures::{extract_offset, extract_offsets, extract_range, nth_brace, offset_of};
