//! Per-day learning and rest totals.
//!
//! # Key layout
//!
//! Counters live in a string key/value store under
//! `<prefix>:<YYYY-MM-DD>:<suffix>` where the suffix is `learnSec` or `restSec`.
//! Older builds recorded rest time under `breakSec`; that key is read as a
//! fallback and migrated forward into `restSec` once per day.
//!
//! Values are decimal integers stored as text. Missing or unparsable values
//! read as zero.
//!
//! # Lifecycle
//!
//! [`DailyTotals`] starts out uninitialized: every read is zero and every key is
//! empty. Adds arriving in that phase are buffered. [`DailyTotals::resolve`]
//! fixes the day key once, loads the persisted counters, runs the legacy
//! migration and folds the buffered adds in.
//!
//! # Failure policy
//!
//! Storage failures never reach callers. They are logged and the in-memory
//! totals stay authoritative for the rest of the process.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::{Category, DayKey};

/// Key suffix used for rest time by older builds.
pub const LEGACY_REST_SUFFIX: &str = "breakSec";

/// Errors reported by a [`CounterStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend is not available at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The backend failed while reading or writing.
    #[error("storage backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// String-keyed durable storage for counter values.
pub trait CounterStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage; also the fallback when durable storage cannot be opened.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value, for tests and imports.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl CounterStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Fully-qualified storage keys for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterKeys {
    pub learning: String,
    pub rest: String,
    pub legacy_rest: String,
}

impl CounterKeys {
    pub fn new(prefix: &str, day: DayKey) -> Self {
        let key = |suffix: &str| format!("{prefix}:{day}:{suffix}");
        Self {
            learning: key(Category::Learning.key_suffix()),
            rest: key(Category::Rest.key_suffix()),
            legacy_rest: key(LEGACY_REST_SUFFIX),
        }
    }

    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Learning => &self.learning,
            Category::Rest => &self.rest,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    learning: u64,
    rest: u64,
}

impl Tally {
    const fn get(self, category: Category) -> u64 {
        match category {
            Category::Learning => self.learning,
            Category::Rest => self.rest,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Learning => &mut self.learning,
            Category::Rest => &mut self.rest,
        }
    }
}

#[derive(Debug)]
enum Phase {
    Uninitialized {
        pending: Tally,
    },
    Resolved {
        day: DayKey,
        keys: CounterKeys,
        totals: Tally,
    },
}

/// Learning and rest seconds for the current day.
pub struct DailyTotals {
    storage: Box<dyn CounterStorage>,
    prefix: String,
    phase: Phase,
}

impl DailyTotals {
    /// Creates an uninitialized store; call [`resolve`](Self::resolve) once the
    /// day is known.
    pub fn new(storage: Box<dyn CounterStorage>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            phase: Phase::Uninitialized {
                pending: Tally::default(),
            },
        }
    }

    /// Fixes the day key and loads persisted totals.
    ///
    /// Only the first call has any effect.
    pub fn resolve(&mut self, day: DayKey) {
        let pending = match &self.phase {
            Phase::Uninitialized { pending } => *pending,
            Phase::Resolved { day: current, .. } => {
                debug!(%current, requested = %day, "day key already resolved");
                return;
            }
        };

        let keys = CounterKeys::new(&self.prefix, day);
        let mut totals = Tally {
            learning: self.read_counter(&keys.learning),
            rest: self.read_counter(&keys.rest),
        };

        if totals.rest == 0 {
            let legacy = self.read_counter(&keys.legacy_rest);
            if legacy > 0 {
                info!(%day, seconds = legacy, "migrating legacy rest total");
                totals.rest = legacy;
                self.write_counter(&keys.rest, legacy);
            }
        }

        for category in Category::ALL {
            let buffered = pending.get(category);
            if buffered > 0 {
                let total = totals.get_mut(category);
                *total = total.saturating_add(buffered);
                self.write_counter(keys.for_category(category), *total);
            }
        }

        debug!(%day, learning = totals.learning, rest = totals.rest, "daily totals resolved");
        self.phase = Phase::Resolved { day, keys, totals };
    }

    /// Whether the day key has been resolved.
    pub const fn is_resolved(&self) -> bool {
        matches!(self.phase, Phase::Resolved { .. })
    }

    /// The resolved day key.
    pub const fn day(&self) -> Option<DayKey> {
        match &self.phase {
            Phase::Resolved { day, .. } => Some(*day),
            Phase::Uninitialized { .. } => None,
        }
    }

    /// Storage key for a category; empty until the day is resolved.
    pub fn key(&self, category: Category) -> &str {
        match &self.phase {
            Phase::Resolved { keys, .. } => keys.for_category(category),
            Phase::Uninitialized { .. } => "",
        }
    }

    /// Seconds recorded today for `category`; zero until resolved.
    pub const fn read(&self, category: Category) -> u64 {
        match &self.phase {
            Phase::Resolved { totals, .. } => totals.get(category),
            Phase::Uninitialized { .. } => 0,
        }
    }

    /// Adds `delta` seconds, clamping negative values to zero.
    ///
    /// Returns the new total.
    pub fn add(&mut self, category: Category, delta: i64) -> u64 {
        self.add_seconds(category, u64::try_from(delta).unwrap_or(0))
    }

    /// Adds whole seconds and returns the new total.
    ///
    /// Before the day resolves the seconds are buffered and the returned total
    /// is zero, matching [`read`](Self::read).
    pub fn add_seconds(&mut self, category: Category, seconds: u64) -> u64 {
        match &mut self.phase {
            Phase::Uninitialized { pending } => {
                let buffered = pending.get_mut(category);
                *buffered = buffered.saturating_add(seconds);
                debug!(%category, seconds, "buffering add until day key resolves");
                0
            }
            Phase::Resolved { keys, totals, .. } => {
                let total = totals.get_mut(category);
                *total = total.saturating_add(seconds);
                let total = *total;
                let key = keys.for_category(category).to_string();
                self.write_counter(&key, total);
                total
            }
        }
    }

    /// Zeroes every counter for the current day, including the legacy key.
    pub fn reset(&mut self) {
        match &mut self.phase {
            Phase::Uninitialized { pending } => *pending = Tally::default(),
            Phase::Resolved { day, keys, totals } => {
                *totals = Tally::default();
                info!(%day, "resetting daily totals");
                let keys = keys.clone();
                for key in [&keys.learning, &keys.rest, &keys.legacy_rest] {
                    self.write_counter(key, 0);
                }
            }
        }
    }

    fn read_counter(&self, key: &str) -> u64 {
        match self.storage.get(key) {
            Ok(Some(raw)) => parse_seconds(&raw),
            Ok(None) => 0,
            Err(err) => {
                warn!(key, error = %err, "failed to read counter; treating as zero");
                0
            }
        }
    }

    fn write_counter(&mut self, key: &str, seconds: u64) {
        if let Err(err) = self.storage.set(key, &seconds.to_string()) {
            warn!(key, seconds, error = %err, "failed to persist counter; keeping in-memory total");
        }
    }
}

/// Parses a stored counter, flooring fractions and mapping anything else to zero.
fn parse_seconds(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Ok(whole) = raw.parse::<u64>() {
        return whole;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => whole_seconds(value),
        _ => 0,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "callers pass finite, non-negative values and saturate on overflow"
)]
pub(crate) fn whole_seconds(value: f64) -> u64 {
    value as u64
}
