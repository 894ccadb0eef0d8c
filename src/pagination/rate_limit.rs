//! Circuit breaker for automatic insertions
//!
//! Inserting a marker changes layout, and a layout change schedules another
//! check. Two limits keep that loop from running away: checks closer together
//! than the minimum interval are dropped, and at most a fixed number of
//! insertions may happen before a full cooldown passes without a check.

use crate::config::PaginationConfig;
use std::fmt;

/// Why a check was not allowed to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    /// Too soon after the previous check
    TooSoon,
    /// The insertion cap for the current window is used up
    CapReached,
}

impl fmt::Display for Throttle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Throttle::TooSoon => f.write_str("too soon after previous check"),
            Throttle::CapReached => f.write_str("insertion cap reached"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval_ms: u64,
    cooldown_ms: u64,
    max_insertions: u32,
    last_check_ms: Option<u64>,
    insertions_in_window: u32,
}

impl RateLimiter {
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            min_interval_ms: config.min_check_interval_ms,
            cooldown_ms: config.cooldown_ms,
            max_insertions: config.max_insertions_per_window,
            last_check_ms: None,
            insertions_in_window: 0,
        }
    }

    /// Decide whether a check may run at `now_ms`. An admitted check becomes
    /// the new reference point for both windows.
    pub fn admit(&mut self, now_ms: u64) -> Result<(), Throttle> {
        if let Some(last) = self.last_check_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.min_interval_ms {
                return Err(Throttle::TooSoon);
            }
            if elapsed > self.cooldown_ms {
                self.insertions_in_window = 0;
            }
        }
        if self.insertions_in_window >= self.max_insertions {
            return Err(Throttle::CapReached);
        }
        self.last_check_ms = Some(now_ms);
        Ok(())
    }

    /// Count a successful insertion against the current window
    pub fn record_insertion(&mut self) {
        self.insertions_in_window += 1;
    }

    pub fn insertions_in_window(&self) -> u32 {
        self.insertions_in_window
    }

    pub fn last_check_ms(&self) -> Option<u64> {
        self.last_check_ms
    }
}
