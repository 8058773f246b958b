//! Rest time driven by an external video player.
//!
//! The host owns the player widget and forwards its signals here. Players
//! report transitions twice, once through discrete callbacks and once through a
//! numeric state-change code, and embedding contexts fire either one or both.
//! Both channels are folded into one [`Transition`] and applied by a single
//! idempotent function, so duplicate delivery is harmless.
//!
//! Watched time is credited at most once per session. The `credited` latch is
//! only cleared by starting a new session.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ticker::{TickHandle, TickSlot};
use crate::totals::whole_seconds;
use crate::types::{Category, Credit, ValidationError};
use crate::video::{self, VideoId};

/// Numeric state-change codes reported by the player.
const STATE_ENDED: i32 = 0;
const STATE_PLAYING: i32 = 1;
const STATE_PAUSED: i32 = 2;

/// Playback control and position capability of an embedded player.
pub trait Player {
    fn play_video(&mut self);
    fn pause_video(&mut self);
    fn stop_video(&mut self);
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);
    /// Total length in seconds; zero while unknown.
    fn duration(&self) -> f64;
    /// Current position in seconds.
    fn current_time(&self) -> f64;
}

/// Signals emitted by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSignal {
    Ready,
    Play,
    Pause,
    End,
    /// Player-specific error code.
    Error(i32),
    /// Numeric state change: `1` playing, `2` paused, `0` ended.
    StateChange(i32),
}

/// Logical transitions both signal channels map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Ready,
    Playing,
    Paused,
    Ended,
    Failed(i32),
}

impl PlayerSignal {
    const fn transition(self) -> Option<Transition> {
        match self {
            Self::Ready => Some(Transition::Ready),
            Self::Play | Self::StateChange(STATE_PLAYING) => Some(Transition::Playing),
            Self::Pause | Self::StateChange(STATE_PAUSED) => Some(Transition::Paused),
            Self::End | Self::StateChange(STATE_ENDED) => Some(Transition::Ended),
            Self::Error(code) => Some(Transition::Failed(code)),
            // Unstarted, buffering and cued carry no timing meaning.
            Self::StateChange(_) => None,
        }
    }
}

/// Player failure; terminal for the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("This video can't be played here. Try another link.")]
    Player { code: i32 },
}

/// Lifecycle of a video-driven rest session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
    Error,
}

impl PlaybackState {
    const fn is_over(self) -> bool {
        matches!(self, Self::Ended | Self::Error)
    }
}

/// Display view of a playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub video_id: Option<VideoId>,
    pub duration_seconds: Option<u64>,
    pub remaining_seconds: Option<u64>,
    pub credited: bool,
    pub status: Option<String>,
}

/// Player-driven timer state machine.
#[derive(Debug, Default)]
pub struct PlayerEngine {
    state: PlaybackState,
    video_id: Option<VideoId>,
    duration_seconds: Option<u64>,
    remaining_seconds: Option<u64>,
    credited: bool,
    status: Option<String>,
    poll: TickSlot,
}

impl PlayerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new session for a raw ID or video link.
    ///
    /// On success the caller mounts a player for the returned ID and forwards
    /// its signals. Invalid input puts the engine in [`PlaybackState::Error`]
    /// with the validation message; no player should be mounted.
    pub fn start(&mut self, input: &str) -> Result<VideoId, ValidationError> {
        self.poll.cancel();
        self.credited = false;
        self.duration_seconds = None;
        self.remaining_seconds = None;

        match video::resolve(input) {
            Ok(id) => {
                info!(video_id = %id, "video rest session started");
                self.state = PlaybackState::Idle;
                self.video_id = Some(id.clone());
                self.status = None;
                Ok(id)
            }
            Err(err) => {
                debug!(input, "rejected video reference");
                self.state = PlaybackState::Error;
                self.video_id = None;
                self.status = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Applies a player signal.
    ///
    /// Returns the full-duration credit when the video ends naturally for the
    /// first time in this session.
    pub fn handle(&mut self, signal: PlayerSignal, player: &dyn Player) -> Option<Credit> {
        let transition = signal.transition()?;
        if self.video_id.is_none() {
            debug!(?signal, "signal without an active session ignored");
            return None;
        }
        self.apply(transition, player)
    }

    /// Refreshes duration and remaining time for a poll tick.
    pub fn poll(&mut self, handle: TickHandle, player: &dyn Player) {
        if !self.poll.is_live(handle) || self.state != PlaybackState::Playing {
            return;
        }
        self.sample(player);
    }

    /// Stops playback at the user's request and credits the watched seconds.
    ///
    /// No-op when no session is live.
    pub fn stop(&mut self, player: &mut dyn Player) -> Option<Credit> {
        if self.video_id.is_none() || self.state.is_over() {
            debug!(state = ?self.state, "video stop ignored");
            return None;
        }

        self.poll.cancel();
        self.sample(player);
        player.stop_video();
        self.state = PlaybackState::Ended;

        let watched = self
            .duration_seconds
            .zip(self.remaining_seconds)
            .map_or(0, |(duration, remaining)| duration.saturating_sub(remaining));
        info!(watched_seconds = watched, "video rest stopped");
        self.credit(watched, false)
    }

    /// Cancels polling without changing the session.
    pub fn teardown(&mut self) {
        if self.poll.cancel().is_some() {
            debug!("player poll cancelled on teardown");
        }
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    pub const fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub const fn duration_seconds(&self) -> Option<u64> {
        self.duration_seconds
    }

    pub const fn remaining_seconds(&self) -> Option<u64> {
        self.remaining_seconds
    }

    pub const fn credited(&self) -> bool {
        self.credited
    }

    /// User-facing status text for validation and playback errors.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The live poll handle while playing.
    pub const fn poll_handle(&self) -> Option<TickHandle> {
        self.poll.active()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            video_id: self.video_id.clone(),
            duration_seconds: self.duration_seconds,
            remaining_seconds: self.remaining_seconds,
            credited: self.credited,
            status: self.status.clone(),
        }
    }

    fn apply(&mut self, transition: Transition, player: &dyn Player) -> Option<Credit> {
        match (self.state, transition) {
            (PlaybackState::Idle, Transition::Ready) => {
                self.sample(player);
                None
            }
            (PlaybackState::Idle | PlaybackState::Paused, Transition::Playing) => {
                debug!(from = ?self.state, "playback started");
                self.state = PlaybackState::Playing;
                self.poll.arm();
                self.sample(player);
                None
            }
            (PlaybackState::Playing, Transition::Paused) => {
                self.poll.cancel();
                self.sample(player);
                self.state = PlaybackState::Paused;
                debug!(remaining = ?self.remaining_seconds, "playback paused");
                None
            }
            (
                PlaybackState::Idle | PlaybackState::Playing | PlaybackState::Paused,
                Transition::Ended,
            ) => {
                self.poll.cancel();
                self.sample(player);
                self.state = PlaybackState::Ended;
                self.remaining_seconds = Some(0);
                let duration = self.duration_seconds.unwrap_or(0);
                info!(duration_seconds = duration, "video finished");
                self.credit(duration, true)
            }
            (
                PlaybackState::Idle | PlaybackState::Playing | PlaybackState::Paused,
                Transition::Failed(code),
            ) => {
                self.poll.cancel();
                let err = PlaybackError::Player { code };
                warn!(code, "player reported an error");
                self.state = PlaybackState::Error;
                self.status = Some(err.to_string());
                None
            }
            (state, transition) => {
                debug!(?state, ?transition, "transition is a no-op");
                None
            }
        }
    }

    /// One-shot credit guarded by the latch.
    fn credit(&mut self, seconds: u64, completed: bool) -> Option<Credit> {
        if self.credited || seconds == 0 {
            return None;
        }
        self.credited = true;
        Some(Credit {
            category: Category::Rest,
            seconds,
            completed,
        })
    }

    fn sample(&mut self, player: &dyn Player) {
        let duration = player.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return;
        }
        let current = player.current_time();
        let current = if current.is_finite() { current } else { 0.0 };
        self.duration_seconds = Some(whole_seconds(duration));
        self.remaining_seconds = Some(whole_seconds((duration - current).max(0.0)));
    }
}
