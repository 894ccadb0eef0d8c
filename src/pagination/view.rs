//! Page indicator derived from measured height and scroll offset

use crate::layout::PageGeometry;
use serde::Serialize;

/// `{ currentPage, totalPages }` as shown by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageIndicator {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for PageIndicator {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

/// Pages needed for the content, and the page under the scroll offset.
///
/// Content fills `content_height` per page, but the scrollable surface draws
/// full pages, so the scroll offset is divided by the full page height.
pub fn recompute(measured_height: f32, scroll_offset: f32, geometry: &PageGeometry) -> PageIndicator {
    let content_height = geometry.content_height();
    let total_pages = if measured_height.is_finite() && measured_height > 0.0 && content_height > 0.0 {
        ((measured_height / content_height).ceil() as u32).max(1)
    } else {
        1
    };

    let scroll = if scroll_offset.is_finite() {
        scroll_offset.max(0.0)
    } else {
        0.0
    };
    let page_height = geometry.page_height;
    let current_page = if page_height > 0.0 {
        ((scroll / page_height).floor() as u32).saturating_add(1)
    } else {
        1
    };

    PageIndicator {
        current_page: current_page.clamp(1, total_pages),
        total_pages,
    }
}

/// Height of content as laid out onto pages. A page break pushes what
/// follows onto a new page, so it fills the rest of the page it ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagedHeight {
    content_height: f32,
    /// Pages closed by a break, in full content heights
    closed: f32,
    /// Content on the page still open
    open: f32,
}

impl PagedHeight {
    pub fn new(content_height: f32) -> Self {
        Self {
            content_height,
            ..Self::default()
        }
    }

    pub fn add_block(&mut self, height: f32) {
        self.open += height;
    }

    pub fn add_break(&mut self) {
        let pages = if self.content_height > 0.0 {
            (self.open / self.content_height).ceil().max(1.0)
        } else {
            1.0
        };
        self.closed += pages * self.content_height;
        self.open = 0.0;
    }

    pub fn total(&self) -> f32 {
        self.closed + self.open
    }
}

/// Last computed indicator plus the inputs it came from
#[derive(Debug, Clone)]
pub struct PaginationView {
    geometry: PageGeometry,
    measured_height: f32,
    scroll_offset: f32,
    indicator: PageIndicator,
}

impl PaginationView {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            measured_height: 0.0,
            scroll_offset: 0.0,
            indicator: PageIndicator::default(),
        }
    }

    /// Layout settled after the debounce; take the new height
    pub fn on_layout_settled(&mut self, measured_height: f32) -> PageIndicator {
        self.measured_height = measured_height;
        self.refresh()
    }

    pub fn on_scroll(&mut self, scroll_offset: f32) -> PageIndicator {
        self.scroll_offset = scroll_offset;
        self.refresh()
    }

    pub fn indicator(&self) -> PageIndicator {
        self.indicator
    }

    /// Scroll offset at the top of `page` (1-based)
    pub fn scroll_offset_for_page(&self, page: u32) -> f32 {
        let page = page.clamp(1, self.indicator.total_pages);
        (page - 1) as f32 * self.geometry.page_height
    }

    fn refresh(&mut self) -> PageIndicator {
        self.indicator = recompute(self.measured_height, self.scroll_offset, &self.geometry);
        self.indicator
    }
}
