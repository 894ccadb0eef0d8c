//! Reference layout: measures blocks the way the page renders them

mod engine;
pub mod font;
mod geometry;
mod line_break;
mod surface;

pub use engine::{BlockLayout, LayoutDiff, LayoutState, LineLayout, INDENT_WIDTH};
pub use font::FontMetrics;
pub use geometry::{PageGeometry, US_LETTER};
pub use surface::LayoutSurface;
