//! A wall-clock stand-in for the embedded video player.
//!
//! The terminal cannot show a video, so this player only keeps time: it
//! advances its position while playing and reports the same signals an
//! embedded player would. The host drains those signals with
//! [`HeadlessPlayer::take_signals`] and forwards them to the orchestrator.

use std::time::Instant;

use lr_core::{Player, PlayerSignal};

/// Numeric state codes mirrored onto the state-change channel.
const STATE_ENDED: i32 = 0;
const STATE_PLAYING: i32 = 1;
const STATE_PAUSED: i32 = 2;

#[derive(Debug)]
pub struct HeadlessPlayer {
    duration: f64,
    /// Position at the last play, pause or seek.
    offset: f64,
    /// Set while playing.
    resumed_at: Option<Instant>,
    finished: bool,
    pending: Vec<PlayerSignal>,
}

impl HeadlessPlayer {
    /// Creates a loaded player for a video of `duration` seconds and queues
    /// its ready signal.
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            offset: 0.0,
            resumed_at: None,
            finished: false,
            pending: vec![PlayerSignal::Ready],
        }
    }

    pub const fn is_playing(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// Emits the end signals once the position reaches the duration.
    pub fn poll_end(&mut self) {
        if self.finished || !self.is_playing() || self.current_time() < self.duration {
            return;
        }
        self.offset = self.duration;
        self.resumed_at = None;
        self.finished = true;
        self.pending
            .extend([PlayerSignal::End, PlayerSignal::StateChange(STATE_ENDED)]);
    }

    /// Takes the signals emitted since the last call.
    pub fn take_signals(&mut self) -> Vec<PlayerSignal> {
        std::mem::take(&mut self.pending)
    }
}

impl Player for HeadlessPlayer {
    fn play_video(&mut self) {
        if self.finished || self.is_playing() {
            return;
        }
        self.resumed_at = Some(Instant::now());
        self.pending
            .extend([PlayerSignal::Play, PlayerSignal::StateChange(STATE_PLAYING)]);
    }

    fn pause_video(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.offset = self.current_time();
        self.resumed_at = None;
        self.pending
            .extend([PlayerSignal::Pause, PlayerSignal::StateChange(STATE_PAUSED)]);
    }

    fn stop_video(&mut self) {
        self.offset = self.current_time();
        self.resumed_at = None;
        self.finished = true;
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) {
        self.offset = seconds.clamp(0.0, self.duration);
        if self.is_playing() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn current_time(&self) -> f64 {
        let played = self
            .resumed_at
            .map_or(0.0, |at| at.elapsed().as_secs_f64());
        (self.offset + played).min(self.duration)
    }
}
