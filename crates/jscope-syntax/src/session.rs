use std::sync::Arc;

use jscope_config::{JscopeConfig, ScopeConfig};
use jscope_core::{LexicalRules, Ruleset, TextEdit, TextSize};
use jscope_vfs::{ContentChange, Document, DocumentError, NoopListener};

use crate::detect::{DetectCx, DetectorChain};
use crate::lexical::{classify, LexicalIndex};
use crate::query::DetachedScope;
use crate::scanner::Scanner;
use crate::store::{Annotation, Scope, ScopeStore, Watermark};

/// Offsets are `u32` ([`TextSize`]); documents past 4 GiB are not supported and their tail
/// offsets saturate at `u32::MAX` instead of wrapping.
pub(crate) fn to_size(offset: usize) -> TextSize {
    TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX))
}

/// One document together with its resolved scope structure.
///
/// Edits made through the session lower the dirty watermark; every query resolves the dirty
/// tail of the document before answering, so callers never manage the cache themselves.
pub struct ScopeSession {
    document: Document,
    rules: Arc<dyn LexicalRules>,
    config: ScopeConfig,
    detectors: DetectorChain,
    store: ScopeStore,
    watermark: Watermark,
    observing: bool,
}

impl ScopeSession {
    /// A session over Java text with the default detectors.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_rules(text, Arc::new(Ruleset::java()), ScopeConfig::default())
    }

    pub fn with_config(text: impl Into<String>, config: &JscopeConfig) -> Self {
        Self::with_rules(
            text,
            Arc::new(config.lexical.clone()),
            config.scopes.clone(),
        )
    }

    pub fn with_rules(
        text: impl Into<String>,
        rules: Arc<dyn LexicalRules>,
        config: ScopeConfig,
    ) -> Self {
        Self {
            document: Document::new(text, 0),
            rules,
            config,
            detectors: DetectorChain::default_chain(),
            store: ScopeStore::new(),
            watermark: Watermark::Uninitialized,
            observing: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn text(&self) -> &str {
        self.document.text()
    }

    pub fn rules(&self) -> &dyn LexicalRules {
        &*self.rules
    }

    pub fn scope_config(&self) -> &ScopeConfig {
        &self.config
    }

    /// The detector chain; detectors pushed here apply from the next dirty region on.
    pub fn detectors_mut(&mut self) -> &mut DetectorChain {
        &mut self.detectors
    }

    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    /// Current annotations. Entries at or after the watermark are dropped as soon as an edit
    /// lowers it, so everything here is valid for the current text; braces not yet
    /// re-resolved are simply absent.
    pub fn store(&self) -> &ScopeStore {
        &self.store
    }

    /// Apply a byte-offset edit. Once the session has resolved, the watermark drops to the
    /// edit's start.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Result<(), DocumentError> {
        if !self.observing {
            return self.document.apply_edit(edit, &mut NoopListener);
        }
        let result = self.document.apply_edit(edit, &mut self.watermark);
        self.drop_stale();
        result
    }

    pub fn apply_changes(
        &mut self,
        version: i32,
        changes: &[ContentChange],
    ) -> Result<Vec<TextEdit>, DocumentError> {
        if !self.observing {
            return self
                .document
                .apply_changes(version, changes, &mut NoopListener);
        }
        // A failing change may follow ones that were already applied and reported.
        let result = self
            .document
            .apply_changes(version, changes, &mut self.watermark);
        self.drop_stale();
        result
    }

    fn drop_stale(&mut self) {
        if let Some(from) = self.watermark.dirty_from() {
            self.store.clear_from(from);
        }
    }

    /// Run `f` with edit notifications disabled.
    ///
    /// Edits made inside `f` do not move the watermark; call [`Self::invalidate_from`] when they
    /// leave the text changed.
    pub fn with_observer_suspended<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> R {
        let observing = std::mem::replace(&mut self.observing, false);
        let result = f(&mut self.document);
        self.observing = observing;
        result
    }

    /// Treat everything at or after `offset` as unresolved.
    pub fn invalidate_from(&mut self, offset: TextSize) {
        self.watermark.lower(offset);
        self.drop_stale();
    }

    /// Resolve every brace at or after the watermark. A no-op when nothing is pending.
    pub fn resolve_all(&mut self) {
        let Some(from) = self.watermark.dirty_from() else {
            return;
        };
        self.observing = true;

        let text = self.document.text_arc();
        let rules = Arc::clone(&self.rules);
        let from = from.min(to_size(text.len()));
        let index = LexicalIndex::build(&text, &*rules);
        let scanner = Scanner::new(&index);
        let cx = DetectCx {
            scanner: &scanner,
            config: &self.config,
        };

        self.store.clear_from(from);
        let braces: Vec<usize> = index.open_braces_from(usize::from(from)).collect();

        // Declaration prefix of the most recently resolved scope, with its enclosing bracket.
        let mut prefix: Option<(usize, usize, Option<usize>)> = None;
        for &brace in braces.iter().rev() {
            let key = to_size(brace);
            if let Some((start, end, parent)) = prefix {
                if (start..end).contains(&brace) && index.parent_of(brace) == parent {
                    continue;
                }
            }

            let annotation = match self.detectors.classify(&cx, brace) {
                Some(detection) => {
                    if let Some(start) = detection.declaration_start {
                        prefix = Some((start, brace, index.parent_of(brace)));
                    }
                    Annotation::Scope(Scope {
                        kind: detection.kind,
                        name: detection.name,
                        declaration_start: detection.declaration_start.map(to_size),
                        open_brace: key,
                        parent: None,
                    })
                }
                None => Annotation::Unknown,
            };
            self.store.insert(key, annotation);
        }

        for &brace in &braces {
            self.link_parent(&index, brace);
        }

        tracing::debug!(
            target: "jscope.syntax",
            from = u32::from(from),
            braces = braces.len(),
            unknown = self.store.unknown_count(),
            "resolved scopes"
        );
        self.watermark = Watermark::Clean;
    }

    /// Point the scope at `brace` to its nearest annotated `{` ancestor, or downgrade it when
    /// that ancestor is unknown. Ancestors must already be linked.
    fn link_parent(&mut self, index: &LexicalIndex<'_>, brace: usize) {
        let text = index.text().as_bytes();
        let enclosing = index
            .ancestors(brace)
            .filter(|&open| text[open] == b'{')
            .find_map(|open| self.store.get(to_size(open)).map(|a| (open, a.is_unknown())));

        let Some(annotation) = self.store.get_mut(to_size(brace)) else {
            return;
        };
        match (enclosing, annotation) {
            (Some((_, true)), annotation) => *annotation = Annotation::Unknown,
            (Some((open, false)), Annotation::Scope(scope)) => scope.parent = Some(to_size(open)),
            _ => {}
        }
    }

    /// The annotation of the brace at `brace`, after resolving.
    pub fn scope_at(&mut self, brace: TextSize) -> Option<&Annotation> {
        self.resolve_all();
        self.store.get(brace)
    }

    /// The innermost scope enclosing `offset` that satisfies `pred`.
    ///
    /// An offset inside a comment or string is first moved to the literal's start.
    pub fn enclosing_scope(
        &mut self,
        offset: TextSize,
        pred: impl Fn(&Scope) -> bool,
    ) -> Option<DetachedScope> {
        self.resolve_all();
        let text = self.document.text();
        let state = classify(text, &*self.rules, usize::from(offset));
        let bytes = text.as_bytes();
        state
            .brackets
            .iter()
            .rev()
            .filter(|&&open| bytes[open] == b'{')
            .filter_map(|&open| self.store.scope(to_size(open)))
            .find(|scope| pred(*scope))
            .map(|scope| DetachedScope::detach(&self.store, scope, &|_| true))
    }
}
