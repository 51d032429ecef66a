use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("questions per session must be > 0")]
    InvalidQuota,

    #[error("band size must be > 0")]
    InvalidBandSize,

    #[error("questions per session ({quota}) cannot exceed the band size ({band_size})")]
    QuotaExceedsBand { quota: usize, band_size: usize },

    #[error("time limit must be between 1 and 600 seconds")]
    InvalidTimeLimit,

    #[error("timer tick must be between 10ms and 1s")]
    InvalidTick,
}

//
// ─── POLICIES ──────────────────────────────────────────────────────────────────
//

/// What happens to a question discarded by the Replace lifeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardPolicy {
    /// Excluded for the rest of the session only.
    #[default]
    Session,
    /// Excluded from every later session run by the same service.
    Permanent,
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Tunables for a quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    quota: usize,
    band_size: usize,
    time_limit: Duration,
    extra_time: Duration,
    tick: Duration,
    shuffle_options: bool,
    restart_timer_after_lifeline: bool,
    discard_policy: DiscardPolicy,
}

impl Default for SessionConfig {
    /// 10 questions from 50-slot bands, 15 seconds each, +10 seconds extra time.
    fn default() -> Self {
        Self {
            quota: 10,
            band_size: 50,
            time_limit: Duration::from_secs(15),
            extra_time: Duration::from_secs(10),
            tick: Duration::from_millis(100),
            shuffle_options: true,
            restart_timer_after_lifeline: false,
            discard_policy: DiscardPolicy::Session,
        }
    }
}

impl SessionConfig {
    /// Creates a config with custom sizes and time limit; other knobs keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is out of range.
    pub fn new(quota: usize, band_size: usize, time_limit: Duration) -> Result<Self, ConfigError> {
        if quota == 0 {
            return Err(ConfigError::InvalidQuota);
        }
        if band_size == 0 {
            return Err(ConfigError::InvalidBandSize);
        }
        if quota > band_size {
            return Err(ConfigError::QuotaExceedsBand { quota, band_size });
        }
        if time_limit < Duration::from_secs(1) || time_limit > Duration::from_secs(600) {
            return Err(ConfigError::InvalidTimeLimit);
        }

        Ok(Self {
            quota,
            band_size,
            time_limit,
            ..Self::default()
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTick` outside 10ms..=1s.
    pub fn with_tick(mut self, tick: Duration) -> Result<Self, ConfigError> {
        if tick < Duration::from_millis(10) || tick > Duration::from_secs(1) {
            return Err(ConfigError::InvalidTick);
        }
        self.tick = tick;
        Ok(self)
    }

    #[must_use]
    pub fn with_extra_time(mut self, extra_time: Duration) -> Self {
        self.extra_time = extra_time;
        self
    }

    /// With shuffling off, options are shown in stored order.
    #[must_use]
    pub fn with_shuffle_options(mut self, shuffle: bool) -> Self {
        self.shuffle_options = shuffle;
        self
    }

    /// When set, each wait after a lifeline restarts the full (possibly extended)
    /// time limit instead of continuing with what was left.
    #[must_use]
    pub fn with_restart_timer_after_lifeline(mut self, restart: bool) -> Self {
        self.restart_timer_after_lifeline = restart;
        self
    }

    #[must_use]
    pub fn with_discard_policy(mut self, policy: DiscardPolicy) -> Self {
        self.discard_policy = policy;
        self
    }

    // Accessors
    #[must_use]
    pub fn quota(&self) -> usize {
        self.quota
    }

    #[must_use]
    pub fn band_size(&self) -> usize {
        self.band_size
    }

    /// Most records a category pool holds: three difficulty bands.
    #[must_use]
    pub fn pool_capacity(&self) -> usize {
        self.band_size * 3
    }

    #[must_use]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    #[must_use]
    pub fn extra_time(&self) -> Duration {
        self.extra_time
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        self.tick
    }

    #[must_use]
    pub fn shuffle_options(&self) -> bool {
        self.shuffle_options
    }

    #[must_use]
    pub fn restart_timer_after_lifeline(&self) -> bool {
        self.restart_timer_after_lifeline
    }

    #[must_use]
    pub fn discard_policy(&self) -> DiscardPolicy {
        self.discard_policy
    }
}
