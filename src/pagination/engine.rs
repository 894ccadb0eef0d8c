use crate::config::PaginationConfig;
use crate::document::BlockId;
use crate::editing::Position;
use crate::layout::PageGeometry;
use crate::pagination::clock::Clock;
use crate::pagination::controller::{AutoPageBreakController, CheckOutcome, Trigger};
use crate::pagination::marker::{self, MarkerError};
use crate::pagination::surface::RenderSurface;
use crate::pagination::view::{PageIndicator, PaginationView};

/// Events the host forwards from its editing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    DocumentChanged,
    LayoutChanged,
    Scrolled { offset: f32 },
}

/// Controller and page indicator for one editing surface.
///
/// Both share the debounce: when the deadline fires the overflow check runs
/// first and the indicator is recomputed from the height it leaves behind.
pub struct Paginator<C: Clock> {
    controller: AutoPageBreakController<C>,
    view: PaginationView,
    geometry: PageGeometry,
}

impl<C: Clock> Paginator<C> {
    pub fn new(geometry: PageGeometry, config: &PaginationConfig, clock: C) -> Self {
        Self {
            controller: AutoPageBreakController::new(&geometry, config, clock),
            view: PaginationView::new(geometry),
            geometry,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn controller(&self) -> &AutoPageBreakController<C> {
        &self.controller
    }

    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::DocumentChanged => self.controller.notify(Trigger::DocumentChanged),
            SurfaceEvent::LayoutChanged => self.controller.notify(Trigger::LayoutChanged),
            SurfaceEvent::Scrolled { offset } => {
                self.view.on_scroll(offset);
            }
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.controller.next_deadline()
    }

    /// Fire the debounce if it is due
    pub fn poll<S>(&mut self, surface: &mut S) -> Option<CheckOutcome>
    where
        S: RenderSurface + ?Sized,
    {
        let outcome = self.controller.poll(surface)?;
        self.settle(surface, &outcome);
        Some(outcome)
    }

    /// Recompute the indicator immediately, outside the debounce
    pub fn refresh<S>(&mut self, surface: &S) -> PageIndicator
    where
        S: RenderSurface + ?Sized,
    {
        self.view.on_layout_settled(surface.total_rendered_height())
    }

    pub fn indicator(&self) -> PageIndicator {
        self.view.indicator()
    }

    pub fn scroll_offset_for_page(&self, page: u32) -> f32 {
        self.view.scroll_offset_for_page(page)
    }

    pub fn insert_manual_page_break<S>(&mut self, surface: &mut S, at: Position) -> Result<BlockId, MarkerError>
    where
        S: RenderSurface + ?Sized,
    {
        let block = marker::insert_manual_break_at(surface, at)?;
        self.controller.notify(Trigger::DocumentChanged);
        Ok(block)
    }

    pub fn enable_auto_page_break(&mut self) {
        self.controller.enable();
    }

    pub fn disable_auto_page_break(&mut self) {
        self.controller.disable();
    }

    pub fn is_auto_page_break_enabled(&self) -> bool {
        self.controller.is_enabled()
    }

    pub fn check_page_overflow<S>(&mut self, surface: &mut S) -> CheckOutcome
    where
        S: RenderSurface + ?Sized,
    {
        let outcome = self.controller.check_page_overflow(surface);
        self.settle(surface, &outcome);
        outcome
    }

    pub fn remove_automatic_breaks<S>(&mut self, surface: &mut S) -> Result<usize, MarkerError>
    where
        S: RenderSurface + ?Sized,
    {
        let removed = marker::remove_automatic_breaks(surface)?;
        if removed > 0 {
            self.controller.notify(Trigger::DocumentChanged);
        }
        Ok(removed)
    }

    pub fn destroy(&mut self) {
        self.controller.destroy();
    }

    /// An inserted marker is reported like any other document change
    fn settle<S>(&mut self, surface: &S, outcome: &CheckOutcome)
    where
        S: RenderSurface + ?Sized,
    {
        if outcome.is_inserted() {
            self.controller.notify(Trigger::DocumentChanged);
        }
        self.view.on_layout_settled(surface.total_rendered_height());
    }
}
