//! Engine configuration
//!
//! Loaded once per editing surface, usually from JSON handed over by the host:
//!
//! ```json
//! {
//!   "page": { "pageHeight": 1123, "pageWidth": 794, "marginSize": 76 },
//!   "pagination": { "debounceMs": 500, "autoPageBreak": false }
//! }
//! ```
//!
//! Every key is optional and falls back to the defaults below.

use crate::layout::PageGeometry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidDimension { name: &'static str, value: f32 },

    #[error("page has no room for content ({width}x{height} after margins)")]
    EmptyContentArea { width: f32, height: f32 },

    #[error("cooldown ({cooldown_ms} ms) must not be shorter than the minimum check interval ({min_check_interval_ms} ms)")]
    CooldownTooShort {
        cooldown_ms: u64,
        min_check_interval_ms: u64,
    },
}

/// Timing and limits for automatic pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    /// Quiet period after the last edit or layout change before checking
    pub debounce_ms: u64,
    /// Checks closer together than this are dropped
    pub min_check_interval_ms: u64,
    /// After this long without a check, the insertion count is forgiven
    pub cooldown_ms: u64,
    /// Hard cap on automatic insertions inside one cooldown window
    pub max_insertions_per_window: u32,
    /// A candidate within this many positions of an existing marker is skipped
    pub guard_window: usize,
    /// Whether automatic insertion starts enabled
    pub auto_page_break: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            min_check_interval_ms: 2000,
            cooldown_ms: 10_000,
            max_insertions_per_window: 3,
            guard_window: 100,
            auto_page_break: true,
        }
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooldown_ms < self.min_check_interval_ms {
            return Err(ConfigError::CooldownTooShort {
                cooldown_ms: self.cooldown_ms,
                min_check_interval_ms: self.min_check_interval_ms,
            });
        }
        Ok(())
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page: PageGeometry,
    pub pagination: PaginationConfig,
}

impl Config {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.page.validate()?;
        self.pagination.validate()
    }
}
