//! Incremental structural scope parsing for Java-like text.
//!
//! The crate never builds a syntax tree. Instead it classifies every code-context `{` of a
//! document (class body, method body, statement block, array initializer, ...) by scanning the
//! text in front of it, and caches the result per brace:
//! - [`lexical`]: comment/string/bracket context of any offset.
//! - [`scanner`]: context-filtered regex search and unit skipping over that context.
//! - [`arglist`]: `type name, …` list parsing with generics.
//! - [`detect`]: the ordered detector chain that classifies one brace.
//! - [`ScopeSession`]: the per-document annotation store, dirty watermark and the queries built
//!   on top of them.

pub mod arglist;
pub mod detect;
pub mod lexical;
mod query;
pub mod scanner;
mod session;
mod store;

pub use arglist::{parse_arg_list, Arg, MalformedArgument};
pub use detect::{
    DetectCx, Detection, DetectorChain, MethodOrStatementDetector, ScopeDetector, ScopeKind,
};
pub use lexical::{classify, Context, LexState, LexicalIndex};
pub use query::{DetachedScope, ImportEntry, ImportKind, Imports};
pub use session::ScopeSession;
pub use store::{Annotation, Scope, ScopeStore, Watermark};
