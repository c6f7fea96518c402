//! In-memory documents and their change notifications.

mod change;
mod document;

pub use change::{ContentChange, EditListener, NoopListener};
pub use document::{Document, DocumentError};
