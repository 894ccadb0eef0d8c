//! Pageflow: automatic pagination for a block-based rich text surface
//!
//! This crate provides:
//! - A block document with page break markers and an HTML-like save format
//! - Incremental layout that measures blocks the way the page renders them
//! - Overflow detection and a debounced, rate-limited auto-pagination
//!   controller that inserts automatic page breaks
//! - A `{ currentPage, totalPages }` indicator for the host UI

pub mod config;
pub mod document;
pub mod editing;
pub mod error;
pub mod layout;
pub mod pagination;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmEditor;

// Re-export primary types
pub use config::{Config, ConfigError, PaginationConfig};
pub use document::{BlockId, BlockKind, BreakKind, Document, HtmlError, NodeType, Schema};
pub use editing::{Position, Transaction, TransactionError, TransactionResult};
pub use error::{Error, Result};
pub use layout::{FontMetrics, LayoutState, LayoutSurface, PageGeometry};
pub use pagination::{
    CheckOutcome, Clock, ManualClock, PageIndicator, Paginator, RenderSurface, SurfaceEvent,
    SystemClock,
};

/// A document, its layout and its paginator, wired the way a host editing
/// surface wires them.
///
/// Every host edit relays the document out, then reports a document change
/// (and a layout change when the total height moved) to the paginator.
/// The host calls [`Editor::tick`] when [`Editor::next_deadline`] passes.
pub struct Editor<C: Clock = SystemClock> {
    document: Document,
    layout: LayoutState,
    paginator: Paginator<C>,
    caret: Option<BlockId>,
}

impl<C: Clock> Editor<C> {
    /// Create an editor holding one empty paragraph
    pub fn new(config: Config, clock: C) -> Result<Self> {
        Self::with_document(Document::new(), config, clock)
    }

    pub fn with_document(document: Document, config: Config, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(document, config, clock))
    }

    fn assemble(document: Document, config: Config, clock: C) -> Self {
        let mut layout = LayoutState::new(config.page, FontMetrics::default());
        layout.relayout(&document);

        let mut editor = Self {
            caret: document.blocks().last().map(|b| b.id),
            document,
            layout,
            paginator: Paginator::new(config.page, &config.pagination, clock),
        };
        editor.refresh_indicator();
        editor
    }

    /// Load a saved document
    pub fn from_html(html: &str, config: Config, clock: C) -> Result<Self> {
        let document = Document::from_html(html)?;
        Self::with_document(document, config, clock)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn geometry(&self) -> &PageGeometry {
        self.paginator.geometry()
    }

    pub fn paginator(&self) -> &Paginator<C> {
        &self.paginator
    }

    pub fn caret(&self) -> Option<BlockId> {
        self.caret
    }

    /// Move the caret to a block. Returns false for unknown blocks.
    pub fn set_caret(&mut self, id: BlockId) -> bool {
        if self.document.block(id).is_none() {
            return false;
        }
        self.caret = Some(id);
        true
    }

    /// Add a block after the caret (or at the end) and move the caret to it
    pub fn insert_block(&mut self, kind: BlockKind, text: &str) -> Result<BlockId> {
        let id = match self.caret {
            Some(after) if self.document.block(after).is_some() => {
                self.document.insert_block_after(after, kind, text)?
            }
            _ => self.document.push_block(kind, text)?,
        };
        self.caret = Some(id);
        self.edited();
        Ok(id)
    }

    pub fn push_paragraph(&mut self, text: &str) -> Result<BlockId> {
        self.insert_block(BlockKind::Paragraph, text)
    }

    pub fn push_heading(&mut self, level: u8, text: &str) -> Result<BlockId> {
        self.insert_block(BlockKind::heading(level), text)
    }

    /// Append text to a block. Returns false for unknown blocks and markers.
    pub fn append_text(&mut self, id: BlockId, text: &str) -> bool {
        if !self.document.append_text(id, text) {
            return false;
        }
        self.edited();
        true
    }

    pub fn remove_block(&mut self, id: BlockId) -> bool {
        let position = self.document.blocks().iter().position(|b| b.id == id);
        if self.document.remove_block(id).is_none() {
            return false;
        }
        if self.caret == Some(id) {
            let blocks = self.document.blocks();
            self.caret = position
                .and_then(|i| blocks.get(i.saturating_sub(1)))
                .or_else(|| blocks.last())
                .map(|b| b.id);
        }
        self.edited();
        true
    }

    /// Swap font metrics. Every block is measured again.
    pub fn set_font_metrics(&mut self, metrics: FontMetrics) {
        self.layout.set_metrics(metrics);
        let diff = self.layout.relayout(&self.document);
        if diff.height_changed {
            self.paginator.handle_event(SurfaceEvent::LayoutChanged);
        }
    }

    /// The rendered surface changed size on its own (resize observer)
    pub fn layout_changed(&mut self) {
        self.paginator.handle_event(SurfaceEvent::LayoutChanged);
    }

    /// When the host should call [`Editor::tick`] next
    pub fn next_deadline(&self) -> Option<u64> {
        self.paginator.next_deadline()
    }

    /// Run the debounced check if it is due
    pub fn tick(&mut self) -> Option<CheckOutcome> {
        let mut surface = LayoutSurface::new(&mut self.document, &mut self.layout);
        self.paginator.poll(&mut surface)
    }

    pub fn scroll_to(&mut self, offset: f32) -> PageIndicator {
        self.paginator.handle_event(SurfaceEvent::Scrolled { offset });
        self.paginator.indicator()
    }

    /// Insert a manual page break after the caret block, or at the end of the
    /// document when there is no caret. The caret moves onto the break.
    pub fn insert_manual_page_break(&mut self) -> Result<BlockId> {
        let at = self
            .caret
            .and_then(|id| {
                let block = self.document.block(id)?;
                let start = self.document.position_of(id)?;
                Some(Position(start.0 + block.node_size()))
            })
            .unwrap_or(Position(self.document.content_size()));

        let mut surface = LayoutSurface::new(&mut self.document, &mut self.layout);
        let id = self.paginator.insert_manual_page_break(&mut surface, at)?;
        self.caret = Some(id);
        self.refresh_indicator();
        Ok(id)
    }

    pub fn enable_auto_page_break(&mut self) {
        self.paginator.enable_auto_page_break();
    }

    pub fn disable_auto_page_break(&mut self) {
        self.paginator.disable_auto_page_break();
    }

    pub fn is_auto_page_break_enabled(&self) -> bool {
        self.paginator.is_auto_page_break_enabled()
    }

    /// Check for overflow now, outside the debounce and the rate limiter
    pub fn check_page_overflow(&mut self) -> CheckOutcome {
        let mut surface = LayoutSurface::new(&mut self.document, &mut self.layout);
        self.paginator.check_page_overflow(&mut surface)
    }

    /// Remove every automatic page break, keeping manual ones
    pub fn remove_automatic_breaks(&mut self) -> Result<usize> {
        let mut surface = LayoutSurface::new(&mut self.document, &mut self.layout);
        let removed = self.paginator.remove_automatic_breaks(&mut surface)?;
        self.refresh_indicator();
        Ok(removed)
    }

    /// Current `{ currentPage, totalPages }`
    pub fn pagination(&self) -> PageIndicator {
        self.paginator.indicator()
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }

    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Tear down: pending checks are dropped and never fire
    pub fn destroy(&mut self) {
        self.paginator.destroy();
    }

    fn edited(&mut self) {
        let diff = self.layout.relayout(&self.document);
        self.paginator.handle_event(SurfaceEvent::DocumentChanged);
        if diff.height_changed {
            self.paginator.handle_event(SurfaceEvent::LayoutChanged);
        }
    }

    fn refresh_indicator(&mut self) {
        let surface = LayoutSurface::new(&mut self.document, &mut self.layout);
        self.paginator.refresh(&surface);
    }
}

impl<C: Clock + Default> Default for Editor<C> {
    fn default() -> Self {
        Self::assemble(Document::new(), Config::default(), C::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(clock: &ManualClock) -> Editor<ManualClock> {
        Editor::new(Config::default(), clock.clone()).unwrap()
    }

    /// Default metrics: 33.6px per single-line paragraph, 25 fit on a page
    fn fill(editor: &mut Editor<ManualClock>, paragraphs: usize) {
        for i in 0..paragraphs {
            editor.push_paragraph(&format!("Paragraph {i}")).unwrap();
        }
    }

    fn automatic_breaks(editor: &Editor<ManualClock>) -> usize {
        editor
            .document()
            .page_breaks()
            .filter(|(_, kind)| *kind == BreakKind::Automatic)
            .count()
    }

    #[test]
    fn test_create_editor() {
        let editor = Editor::new(Config::default(), ManualClock::new(0)).unwrap();
        assert_eq!(editor.text(), "");
        assert_eq!(editor.pagination(), PageIndicator { current_page: 1, total_pages: 1 });
        assert_eq!(editor.next_deadline(), None);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = Config::default();
        config.page.margin_size = 600.0;
        assert!(matches!(
            Editor::new(config, ManualClock::new(0)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_edit_arms_debounce() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        editor.push_paragraph("Hello").unwrap();
        assert_eq!(editor.next_deadline(), Some(1_000));

        clock.advance(999);
        assert_eq!(editor.tick(), None);
        clock.advance(1);
        assert_eq!(editor.tick(), Some(CheckOutcome::NoOverflow));
    }

    #[test]
    fn test_overflow_inserts_automatic_break() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        fill(&mut editor, 40);

        clock.advance(1_000);
        let outcome = editor.tick().unwrap();
        assert!(outcome.is_inserted());
        assert_eq!(automatic_breaks(&editor), 1);
        assert_eq!(editor.pagination().total_pages, 2);
        // the insertion itself re-arms the debounce
        assert!(editor.next_deadline().is_some());
        clock.advance(1_000);
        assert_eq!(
            editor.tick(),
            Some(CheckOutcome::Throttled(pagination::Throttle::TooSoon))
        );
    }

    #[test]
    fn test_auto_pagination_settles() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        fill(&mut editor, 120);

        for _ in 0..40 {
            editor.layout_changed();
            clock.advance(2_500);
            editor.tick();
        }
        assert_eq!(editor.check_page_overflow(), CheckOutcome::NoCandidate);
        assert!(automatic_breaks(&editor) >= 4);
    }

    #[test]
    fn test_pages_of_short_blocks_keep_paginating() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        for _ in 0..80 {
            editor.push_paragraph("").unwrap();
        }

        let outcomes: Vec<_> = (0..10).map(|_| editor.check_page_overflow()).collect();
        assert!(!outcomes
            .iter()
            .any(|o| matches!(o, CheckOutcome::GuardRejected { .. })));
        assert_eq!(automatic_breaks(&editor), 3);
        assert_eq!(outcomes[3], CheckOutcome::NoCandidate);
        assert_eq!(editor.pagination().total_pages, 4);
    }

    #[test]
    fn test_manual_break_mid_page_adds_a_page() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        editor.push_paragraph("one").unwrap();
        editor.insert_manual_page_break().unwrap();
        editor.push_paragraph("two").unwrap();

        clock.advance(1_000);
        assert_eq!(editor.tick(), Some(CheckOutcome::NoCandidate));
        assert_eq!(editor.pagination(), PageIndicator { current_page: 1, total_pages: 2 });
        assert_eq!(editor.scroll_to(1_100.0).current_page, 2);
    }

    #[test]
    fn test_disabled_editor_only_paginates_on_request() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        editor.disable_auto_page_break();
        fill(&mut editor, 60);

        clock.advance(1_000);
        assert_eq!(editor.tick(), Some(CheckOutcome::Disabled));
        assert_eq!(automatic_breaks(&editor), 0);

        assert!(editor.check_page_overflow().is_inserted());
        assert_eq!(automatic_breaks(&editor), 1);

        editor.enable_auto_page_break();
        assert!(editor.is_auto_page_break_enabled());
    }

    #[test]
    fn test_manual_break_after_caret() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        let first = editor.push_paragraph("one").unwrap();
        editor.push_paragraph("two").unwrap();
        assert!(editor.set_caret(first));

        editor.insert_manual_page_break().unwrap();
        let kinds: Vec<_> = editor.document().blocks().iter().map(|b| b.kind.node_type()).collect();
        assert_eq!(
            kinds,
            vec![NodeType::Paragraph, NodeType::Paragraph, NodeType::PageBreak, NodeType::Paragraph]
        );
    }

    #[test]
    fn test_manual_breaks_survive_removal() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        fill(&mut editor, 10);
        editor.insert_manual_page_break().unwrap();
        fill(&mut editor, 40);
        assert!(editor.check_page_overflow().is_inserted());

        assert_eq!(editor.remove_automatic_breaks().unwrap(), 1);
        let breaks: Vec<_> = editor.document().page_breaks().map(|(_, k)| k).collect();
        assert_eq!(breaks, vec![BreakKind::Manual]);
    }

    #[test]
    fn test_scroll_updates_indicator() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        fill(&mut editor, 80);
        clock.advance(1_000);
        editor.tick();

        let total = editor.pagination().total_pages;
        assert!(total >= 3);
        assert_eq!(editor.scroll_to(1_100.0).current_page, 2);
        assert_eq!(editor.scroll_to(1.0e6).current_page, total);
    }

    #[test]
    fn test_remove_block_moves_caret() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        let a = editor.push_paragraph("a").unwrap();
        let b = editor.push_paragraph("b").unwrap();
        assert!(editor.remove_block(b));
        assert_eq!(editor.caret(), Some(a));
        assert!(!editor.remove_block(b));
    }

    #[test]
    fn test_html_round_trip_through_editor() {
        let clock = ManualClock::new(0);
        let html = "<h1>Title</h1>\n<p>Body</p>\n<div data-type=\"page-break\" data-kind=\"automatic\" class=\"page-break\"></div>\n<p>More</p>\n";
        let editor = Editor::from_html(html, Config::default(), clock).unwrap();
        assert_eq!(editor.to_html(), html);
    }

    #[test]
    fn test_destroy() {
        let clock = ManualClock::new(0);
        let mut editor = editor(&clock);
        fill(&mut editor, 40);
        editor.destroy();
        clock.advance(5_000);
        assert_eq!(editor.tick(), None);
        assert_eq!(automatic_breaks(&editor), 0);
    }
}
