//! Session timing core for the learn/rest timer.
//!
//! This crate contains the fundamental types and logic for:
//! - Video references: resolving links and raw IDs to a canonical video ID
//! - Daily totals: per-day learning/rest counters with legacy key migration
//! - Countdown engine: wall-clock anchored countdown used for learning and plain rest
//! - Player engine: rest time driven by an external video player's progress
//! - Orchestration: wiring the engines to the shared totals

pub mod clock;
pub mod countdown;
pub mod notify;
pub mod orchestrator;
pub mod player;
pub mod ticker;
pub mod totals;
pub mod types;
pub mod video;

pub use clock::{Clock, SystemClock};
pub use countdown::{CountdownEngine, CountdownSnapshot, CountdownState};
pub use notify::{Notifier, NullNotifier};
pub use orchestrator::{Orchestrator, RestMode, TodayTotals};
pub use player::{PlaybackError, PlaybackSnapshot, PlaybackState, Player, PlayerEngine, PlayerSignal};
pub use ticker::{DEFAULT_TICK_INTERVAL, TickHandle, TickSlot};
pub use totals::{CounterKeys, CounterStorage, DailyTotals, MemoryStorage, StorageError};
pub use types::{Category, Credit, DayKey, EngineError, ValidationError};
pub use video::{VideoId, resolve};
