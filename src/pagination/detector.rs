//! Overflow detection
//!
//! Walks top-level blocks in document order, summing rendered heights, and
//! reports the first block that would push the current page past its content
//! height. Existing page breaks start a fresh page: the running height never
//! crosses a marker.

use crate::editing::Position;
use crate::pagination::surface::RenderSurface;
use std::ops::ControlFlow;

/// Where the next page break should go
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakCandidate {
    /// Start of the block that overflows; the break goes right before it
    pub position: Position,
    /// First position of the page the block sits on
    pub page_start: Position,
    /// Height already used on that page before the block
    pub height_before: f32,
}

impl BreakCandidate {
    /// The overflowing block is the first thing on its page, so it is taller
    /// than a page by itself
    pub fn starts_page(&self) -> bool {
        self.position == self.page_start
    }
}

/// Find the first overflowing block, with the page it overflows
pub fn find_break_candidate<S>(surface: &S, max_content_height: f32) -> Option<BreakCandidate>
where
    S: RenderSurface + ?Sized,
{
    let mut accumulated = 0.0f32;
    let mut page_start = Position(0);
    let mut found = None;

    surface.traverse_blocks(&mut |visit| {
        if visit.is_page_break() {
            accumulated = 0.0;
            page_start = Position(visit.position.0 + visit.node_size);
            return ControlFlow::Continue(());
        }

        // Not rendered yet: counts as nothing, measured on a later pass
        let height = surface
            .measure_rendered_height(visit.position)
            .unwrap_or_else(|| {
                tracing::trace!(position = %visit.position, "block not measurable yet");
                0.0
            });

        let before = accumulated;
        accumulated += height;
        if accumulated > max_content_height {
            found = Some(BreakCandidate {
                position: visit.position,
                page_start,
                height_before: before,
            });
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });

    found
}

/// Position before the first block that overflows its page, if any
pub fn find_break_position<S>(surface: &S, max_content_height: f32) -> Option<Position>
where
    S: RenderSurface + ?Sized,
{
    find_break_candidate(surface, max_content_height).map(|c| c.position)
}

/// Whether another marker already sits close to the candidate. The marker
/// that opens the candidate's page is a full page of content away and does
/// not count, however few positions the page spans.
pub fn is_guarded<S>(surface: &S, candidate: &BreakCandidate, window: usize) -> bool
where
    S: RenderSurface + ?Sized,
{
    break_within(surface, candidate.position, window, candidate.page_start)
}

/// Whether a marker at or after `from` lies within `window` positions of
/// `position`
fn break_within<S>(surface: &S, position: Position, window: usize, from: Position) -> bool
where
    S: RenderSurface + ?Sized,
{
    let mut near = false;
    surface.traverse_blocks(&mut |visit| {
        if visit.position.0 > position.0.saturating_add(window) {
            return ControlFlow::Break(());
        }
        if visit.position >= from && visit.is_page_break() && visit.position.distance(position) <= window {
            near = true;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    near
}
