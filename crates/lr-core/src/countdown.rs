//! Wall-clock anchored countdown used for learning and plain rest.
//!
//! Remaining time is always recomputed from the anchor instead of decremented
//! per tick, so missed or late ticks never skew the display.
//!
//! Stopping does not pause in the usual sense: the next `start` begins a brand
//! new countdown from the current minute input.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::ticker::{TickHandle, TickSlot};
use crate::types::{Category, Credit, EngineError};

const SECONDS_PER_MINUTE: u64 = 60;

/// Lifecycle of one countdown card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    #[default]
    Idle,
    Running,
    Paused,
    Done,
}

/// Display view of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownSnapshot {
    pub category: Category,
    pub state: CountdownState,
    pub target_seconds: u64,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
}

/// Countdown state machine for a single card.
#[derive(Debug)]
pub struct CountdownEngine {
    category: Category,
    state: CountdownState,
    target_seconds: u64,
    elapsed_seconds: u64,
    anchor: Option<DateTime<Utc>>,
    ticker: TickSlot,
}

impl CountdownEngine {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            state: CountdownState::Idle,
            target_seconds: 0,
            elapsed_seconds: 0,
            anchor: None,
            ticker: TickSlot::default(),
        }
    }

    /// Begins a new countdown of `minutes` (at least one) anchored at `now`.
    ///
    /// Returns the handle the host must attach to periodic ticks.
    pub fn start(&mut self, minutes: i64, now: DateTime<Utc>) -> Result<TickHandle, EngineError> {
        if self.state == CountdownState::Running {
            return Err(EngineError::AlreadyRunning {
                category: self.category,
            });
        }

        let minutes = u64::try_from(minutes.max(1)).unwrap_or(1);
        self.target_seconds = minutes.saturating_mul(SECONDS_PER_MINUTE);
        self.elapsed_seconds = 0;
        self.anchor = Some(now);
        self.state = CountdownState::Running;
        let handle = self.ticker.arm();

        info!(category = %self.category, target_seconds = self.target_seconds, "countdown started");
        Ok(handle)
    }

    /// Recomputes elapsed/remaining for a periodic tick.
    ///
    /// Returns the full-target credit when the countdown reaches zero. Ticks
    /// carrying a stale handle are ignored.
    pub fn tick(&mut self, handle: TickHandle, now: DateTime<Utc>) -> Option<Credit> {
        if !self.ticker.is_live(handle) || self.state != CountdownState::Running {
            return None;
        }

        self.sync(now);
        if self.remaining_seconds() > 0 {
            return None;
        }

        self.ticker.cancel();
        self.state = CountdownState::Done;
        info!(category = %self.category, seconds = self.target_seconds, "countdown complete");
        Some(Credit {
            category: self.category,
            seconds: self.target_seconds,
            completed: true,
        })
    }

    /// Stops a running countdown and credits the measured elapsed seconds.
    ///
    /// No-op unless running.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Credit> {
        if self.state != CountdownState::Running {
            debug!(category = %self.category, state = ?self.state, "stop ignored");
            return None;
        }

        self.ticker.cancel();
        self.sync(now);
        self.state = CountdownState::Paused;
        info!(category = %self.category, elapsed_seconds = self.elapsed_seconds, "countdown stopped");
        Some(Credit {
            category: self.category,
            seconds: self.elapsed_seconds,
            completed: false,
        })
    }

    /// Cancels periodic work without touching the session's numbers.
    pub fn teardown(&mut self) {
        if self.ticker.cancel().is_some() {
            debug!(category = %self.category, "countdown tick cancelled on teardown");
        }
    }

    pub const fn category(&self) -> Category {
        self.category
    }

    pub const fn state(&self) -> CountdownState {
        self.state
    }

    pub const fn target_seconds(&self) -> u64 {
        self.target_seconds
    }

    pub const fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub const fn remaining_seconds(&self) -> u64 {
        self.target_seconds.saturating_sub(self.elapsed_seconds)
    }

    /// The live tick handle while running.
    pub const fn tick_handle(&self) -> Option<TickHandle> {
        self.ticker.active()
    }

    pub const fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            category: self.category,
            state: self.state,
            target_seconds: self.target_seconds,
            elapsed_seconds: self.elapsed_seconds,
            remaining_seconds: self.remaining_seconds(),
        }
    }

    /// Elapsed whole seconds since the anchor, clamped to the target.
    fn sync(&mut self, now: DateTime<Utc>) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let elapsed_ms = (now - anchor).num_milliseconds().max(0);
        let elapsed = u64::try_from(elapsed_ms / 1000).unwrap_or(0);
        self.elapsed_seconds = elapsed.min(self.target_seconds);
    }
}
