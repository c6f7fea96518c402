use jscope_core::{Range, TextSize};

/// An LSP-style content change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    /// The range of text to replace. If `None`, the entire document is replaced.
    pub range: Option<Range>,
    /// Replacement text.
    pub text: String,
}

impl ContentChange {
    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }
}

/// Mutation hook of a [`crate::Document`].
///
/// Called once per applied edit, after the text has changed, with the earliest byte offset whose
/// content may differ from the previous snapshot.
pub trait EditListener {
    fn text_changed(&mut self, earliest: TextSize);
}

/// Listener that ignores every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl EditListener for NoopListener {
    fn text_changed(&mut self, _earliest: TextSize) {}
}

impl<F: FnMut(TextSize)> EditListener for F {
    fn text_changed(&mut self, earliest: TextSize) {
        self(earliest)
    }
}
