//! Auto-pagination controller
//!
//! A small state machine driven by the host:
//!
//! - [`notify`](AutoPageBreakController::notify) arms the debounce deadline on
//!   every document or layout change. A new trigger pushes the deadline back.
//! - [`poll`](AutoPageBreakController::poll) runs the check once the deadline
//!   has passed and the input has been quiet.
//! - [`next_deadline`](AutoPageBreakController::next_deadline) tells the host
//!   when the next poll is worth making.
//!
//! The controller never owns a timer, so tests drive it with a [`ManualClock`].
//!
//! [`ManualClock`]: crate::pagination::ManualClock

use crate::config::PaginationConfig;
use crate::document::BlockId;
use crate::editing::Position;
use crate::layout::PageGeometry;
use crate::pagination::clock::Clock;
use crate::pagination::detector::{find_break_candidate, is_guarded};
use crate::pagination::marker::{insert_automatic_break_at, MarkerError};
use crate::pagination::rate_limit::{RateLimiter, Throttle};
use crate::pagination::surface::RenderSurface;

/// What moved on the host side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    DocumentChanged,
    LayoutChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Debouncing { deadline_ms: u64 },
    Checking,
}

/// Result of one overflow check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckOutcome {
    /// Automatic insertion is switched off
    Disabled,
    /// The rate limiter dropped the check
    Throttled(Throttle),
    /// Everything fits on one page
    NoOverflow,
    /// Taller than a page in total, but every page fits between its markers
    NoCandidate,
    /// A single block taller than the content area starts its page
    OversizedBlock { position: Position },
    /// A marker already sits close to the candidate
    GuardRejected { position: Position },
    Inserted { position: Position, block: BlockId },
    /// The document moved underneath the insertion
    TransactionRejected,
    /// The schema has no page break node
    SchemaMissing,
}

impl CheckOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckOutcome::Disabled => "disabled",
            CheckOutcome::Throttled(Throttle::TooSoon) => "too-soon",
            CheckOutcome::Throttled(Throttle::CapReached) => "cap-reached",
            CheckOutcome::NoOverflow => "no-overflow",
            CheckOutcome::NoCandidate => "no-candidate",
            CheckOutcome::OversizedBlock { .. } => "oversized-block",
            CheckOutcome::GuardRejected { .. } => "guard-rejected",
            CheckOutcome::Inserted { .. } => "inserted",
            CheckOutcome::TransactionRejected => "transaction-rejected",
            CheckOutcome::SchemaMissing => "schema-missing",
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, CheckOutcome::Inserted { .. })
    }
}

pub struct AutoPageBreakController<C: Clock> {
    clock: C,
    content_height: f32,
    debounce_ms: u64,
    guard_window: usize,
    enabled: bool,
    limiter: RateLimiter,
    state: ControllerState,
    destroyed: bool,
}

impl<C: Clock> AutoPageBreakController<C> {
    pub fn new(geometry: &PageGeometry, config: &PaginationConfig, clock: C) -> Self {
        Self {
            clock,
            content_height: geometry.content_height(),
            debounce_ms: config.debounce_ms,
            guard_window: config.guard_window,
            enabled: config.auto_page_break,
            limiter: RateLimiter::new(config),
            state: ControllerState::Idle,
            destroyed: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch automatic insertion on. Existing markers are not touched.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Switch automatic insertion off. A pending deadline still fires and
    /// finds the controller disabled.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// Arm or re-arm the debounce deadline
    pub fn notify(&mut self, trigger: Trigger) {
        if self.destroyed {
            return;
        }
        let deadline_ms = self.clock.now_ms().saturating_add(self.debounce_ms);
        tracing::trace!(?trigger, deadline_ms, "debounce armed");
        self.state = ControllerState::Debouncing { deadline_ms };
    }

    /// When the host should poll next, if a check is pending
    pub fn next_deadline(&self) -> Option<u64> {
        match self.state {
            ControllerState::Debouncing { deadline_ms } => Some(deadline_ms),
            _ => None,
        }
    }

    /// Run the pending check if its deadline has passed. Returns `None` when
    /// nothing was due.
    pub fn poll<S>(&mut self, surface: &mut S) -> Option<CheckOutcome>
    where
        S: RenderSurface + ?Sized,
    {
        let ControllerState::Debouncing { deadline_ms } = self.state else {
            return None;
        };
        let now = self.clock.now_ms();
        if now < deadline_ms {
            return None;
        }

        self.state = ControllerState::Checking;
        let outcome = if !self.enabled {
            CheckOutcome::Disabled
        } else {
            match self.limiter.admit(now) {
                Err(throttle) => CheckOutcome::Throttled(throttle),
                Ok(()) => {
                    let outcome = self.run_check(surface);
                    if outcome.is_inserted() {
                        self.limiter.record_insertion();
                    }
                    outcome
                }
            }
        };
        self.state = ControllerState::Idle;

        tracing::debug!(
            outcome = outcome.as_str(),
            insertions = self.limiter.insertions_in_window(),
            "auto page break check"
        );
        Some(outcome)
    }

    /// Check for overflow right now, skipping the debounce and the rate
    /// limiter. Insertions made here do not count against the window.
    pub fn check_page_overflow<S>(&mut self, surface: &mut S) -> CheckOutcome
    where
        S: RenderSurface + ?Sized,
    {
        if self.destroyed {
            return CheckOutcome::Disabled;
        }
        let outcome = self.run_check(surface);
        tracing::debug!(outcome = outcome.as_str(), "explicit page overflow check");
        outcome
    }

    /// Drop any pending check. Later triggers and polls do nothing.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.state = ControllerState::Idle;
    }

    fn run_check<S>(&self, surface: &mut S) -> CheckOutcome
    where
        S: RenderSurface + ?Sized,
    {
        if surface.total_rendered_height() <= self.content_height {
            return CheckOutcome::NoOverflow;
        }

        let Some(candidate) = find_break_candidate(surface, self.content_height) else {
            return CheckOutcome::NoCandidate;
        };
        let position = candidate.position;
        if candidate.starts_page() {
            return CheckOutcome::OversizedBlock { position };
        }
        if is_guarded(surface, &candidate, self.guard_window) {
            return CheckOutcome::GuardRejected { position };
        }

        match insert_automatic_break_at(surface, position) {
            Ok(block) => CheckOutcome::Inserted { position, block },
            Err(MarkerError::SchemaMissing) => {
                tracing::warn!("page break node is not registered, skipping automatic insertion");
                CheckOutcome::SchemaMissing
            }
            Err(MarkerError::Rejected(err)) => {
                tracing::info!(%err, %position, "automatic page break rejected");
                CheckOutcome::TransactionRejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BreakKind, NodeType, Schema};
    use crate::pagination::clock::ManualClock;
    use crate::pagination::testing::HeightTable;

    const PAGE: f32 = 864.0;

    fn controller(clock: &ManualClock) -> AutoPageBreakController<ManualClock> {
        AutoPageBreakController::new(&PageGeometry::default(), &PaginationConfig::default(), clock.clone())
    }

    /// Trigger, wait out the debounce and poll
    fn cycle(
        controller: &mut AutoPageBreakController<ManualClock>,
        surface: &mut HeightTable,
        clock: &ManualClock,
    ) -> Option<CheckOutcome> {
        controller.notify(Trigger::LayoutChanged);
        clock.advance(1_000);
        controller.poll(surface)
    }

    #[test]
    fn test_debounce_resets_on_new_trigger() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[100.0]);

        controller.notify(Trigger::DocumentChanged);
        assert_eq!(controller.next_deadline(), Some(1_000));
        clock.advance(500);
        controller.notify(Trigger::DocumentChanged);
        clock.advance(600);
        assert_eq!(controller.poll(&mut surface), None);
        assert_eq!(controller.next_deadline(), Some(1_500));

        clock.advance(400);
        assert_eq!(controller.poll(&mut surface), Some(CheckOutcome::NoOverflow));
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_poll_without_trigger_does_nothing() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[2_000.0, 100.0]);
        clock.advance(5_000);
        assert_eq!(controller.poll(&mut surface), None);
    }

    #[test]
    fn test_scenario_two_and_a_half_pages() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        // 10 x 216 = 2.5 pages
        let mut surface = HeightTable::new(&[216.0; 10]);
        assert_eq!(surface.document.blocks().len() as f32 * 216.0, 2.5 * PAGE);

        let first = cycle(&mut controller, &mut surface, &clock).unwrap();
        assert!(matches!(first, CheckOutcome::Inserted { position: Position(240), .. }));
        assert_eq!(surface.automatic_breaks(), 1);

        // the layout change from the insertion re-triggers too early
        let echo = cycle(&mut controller, &mut surface, &clock).unwrap();
        assert_eq!(echo, CheckOutcome::Throttled(Throttle::TooSoon));
        assert_eq!(surface.automatic_breaks(), 1);

        let second = cycle(&mut controller, &mut surface, &clock).unwrap();
        assert!(matches!(second, CheckOutcome::Inserted { position: Position(481), .. }));

        clock.advance(1_000);
        let settled = cycle(&mut controller, &mut surface, &clock).unwrap();
        assert_eq!(settled, CheckOutcome::NoCandidate);
        assert_eq!(surface.automatic_breaks(), 2);
    }

    #[test]
    fn test_burst_of_edits_is_capped() {
        let clock = ManualClock::new(0);
        let config = PaginationConfig {
            debounce_ms: 100,
            ..PaginationConfig::default()
        };
        let mut controller =
            AutoPageBreakController::new(&PageGeometry::default(), &config, clock.clone());
        let mut surface = HeightTable::new(&[300.0; 3]);

        // 10 overflowing edits within 5 seconds
        let mut inserted = 0;
        for _ in 0..10 {
            surface.push_paragraph(300.0);
            controller.notify(Trigger::DocumentChanged);
            clock.advance(500);
            if let Some(outcome) = controller.poll(&mut surface) {
                inserted += outcome.is_inserted() as usize;
            }
        }
        assert!(inserted > 0);
        assert!(inserted <= 3);
        assert_eq!(surface.automatic_breaks(), inserted);
    }

    #[test]
    fn test_insertion_cap_holds_until_cooldown() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[300.0; 40]);

        let mut outcomes = Vec::new();
        for _ in 0..6 {
            controller.notify(Trigger::LayoutChanged);
            clock.advance(2_100);
            outcomes.extend(controller.poll(&mut surface));
        }
        assert_eq!(outcomes.iter().filter(|o| o.is_inserted()).count(), 3);
        assert_eq!(outcomes[5], CheckOutcome::Throttled(Throttle::CapReached));

        // a full quiet cooldown forgives the window
        clock.advance(10_000);
        let outcome = cycle(&mut controller, &mut surface, &clock).unwrap();
        assert!(outcome.is_inserted());
    }

    #[test]
    fn test_disabled_skips_but_explicit_check_inserts() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[300.0]);

        controller.disable();
        for _ in 0..4 {
            surface.push_paragraph(300.0);
            clock.advance(2_000);
            assert_eq!(
                cycle(&mut controller, &mut surface, &clock),
                Some(CheckOutcome::Disabled)
            );
        }
        assert_eq!(surface.automatic_breaks(), 0);

        let outcome = controller.check_page_overflow(&mut surface);
        assert!(outcome.is_inserted());
        assert_eq!(surface.automatic_breaks(), 1);
    }

    #[test]
    fn test_explicit_check_twice_inserts_once() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[300.0; 3]);

        assert!(controller.check_page_overflow(&mut surface).is_inserted());
        assert_eq!(controller.check_page_overflow(&mut surface), CheckOutcome::NoCandidate);
        assert_eq!(surface.automatic_breaks(), 1);
    }

    #[test]
    fn test_guard_rejects_candidate_near_marker() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[300.0; 3]);
        surface.push_break(BreakKind::Manual);
        surface.push_paragraph(300.0);

        assert_eq!(
            controller.check_page_overflow(&mut surface),
            CheckOutcome::GuardRejected { position: Position(120) }
        );
        assert_eq!(surface.breaks(), vec![(Position(180), BreakKind::Manual)]);
    }

    #[test]
    fn test_oversized_first_block() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[1_200.0]);
        assert_eq!(
            controller.check_page_overflow(&mut surface),
            CheckOutcome::OversizedBlock { position: Position(0) }
        );
        assert!(surface.breaks().is_empty());
    }

    #[test]
    fn test_rejected_transaction_is_not_counted() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[300.0; 40]);
        surface.reject_next = true;

        assert_eq!(
            cycle(&mut controller, &mut surface, &clock),
            Some(CheckOutcome::TransactionRejected)
        );
        assert!(surface.breaks().is_empty());
        assert_eq!(controller.limiter.insertions_in_window(), 0);

        // next natural trigger retries
        clock.advance(2_000);
        assert!(cycle(&mut controller, &mut surface, &clock).unwrap().is_inserted());
    }

    #[test]
    fn test_schema_missing() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface =
            HeightTable::with_schema(Schema::new().without(NodeType::PageBreak), &[500.0, 500.0]);
        assert_eq!(
            cycle(&mut controller, &mut surface, &clock),
            Some(CheckOutcome::SchemaMissing)
        );
    }

    #[test]
    fn test_destroy_clears_pending_deadline() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);
        let mut surface = HeightTable::new(&[500.0, 500.0]);

        controller.notify(Trigger::DocumentChanged);
        controller.destroy();
        assert_eq!(controller.next_deadline(), None);

        controller.notify(Trigger::LayoutChanged);
        clock.advance(5_000);
        assert_eq!(controller.poll(&mut surface), None);
        assert_eq!(controller.check_page_overflow(&mut surface), CheckOutcome::Disabled);
        assert!(surface.breaks().is_empty());
    }
}
