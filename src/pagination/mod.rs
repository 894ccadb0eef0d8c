//! Automatic pagination
//!
//! Page break markers, overflow detection, the debounced auto-pagination
//! controller and the page indicator shown to the user.

mod clock;
mod controller;
mod detector;
mod engine;
mod marker;
mod rate_limit;
mod surface;
mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{AutoPageBreakController, CheckOutcome, ControllerState, Trigger};
pub use detector::{find_break_candidate, find_break_position, is_guarded, BreakCandidate};
pub use engine::{Paginator, SurfaceEvent};
pub use marker::{insert_manual_break_at, remove_automatic_breaks, MarkerError};
pub use rate_limit::{RateLimiter, Throttle};
pub use surface::{BlockVisit, RenderSurface};
pub use view::{recompute, PageIndicator, PagedHeight, PaginationView};
