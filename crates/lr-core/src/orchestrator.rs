//! Wires the timer engines to the shared daily totals.
//!
//! One countdown drives the learning card. The rest card has two independent
//! engines, a plain countdown and a player-driven one; [`RestMode`] only picks
//! which one the host shows. Switching modes never stops or transfers a
//! session running in the other engine.
//!
//! Every credit an engine produces is applied to the totals before the
//! completion cue fires, so a notifier that reads totals sees the new value.

use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::countdown::CountdownEngine;
use crate::notify::Notifier;
use crate::player::{Player, PlayerEngine, PlayerSignal};
use crate::ticker::TickHandle;
use crate::totals::DailyTotals;
use crate::types::{Category, Credit, DayKey, EngineError, ValidationError};
use crate::video::VideoId;

/// How the rest card measures rest time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestMode {
    #[default]
    Plain,
    Video,
}

/// Today's totals for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodayTotals {
    pub day: Option<DayKey>,
    pub learning_seconds: u64,
    pub rest_seconds: u64,
}

/// Owns the totals store and one engine per card.
pub struct Orchestrator {
    totals: DailyTotals,
    learning: CountdownEngine,
    rest: CountdownEngine,
    video_rest: PlayerEngine,
    rest_mode: RestMode,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
}

impl Orchestrator {
    pub fn new(totals: DailyTotals, clock: Box<dyn Clock>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            totals,
            learning: CountdownEngine::new(Category::Learning),
            rest: CountdownEngine::new(Category::Rest),
            video_rest: PlayerEngine::new(),
            rest_mode: RestMode::default(),
            clock,
            notifier,
        }
    }

    /// Resolves the accounting day. Only the first call has any effect; the
    /// day then stays fixed for the life of the process.
    pub fn mount(&mut self, day: DayKey) {
        self.totals.resolve(day);
    }

    /// Resolves the accounting day from the clock's local date.
    pub fn mount_today(&mut self) {
        let day = DayKey::containing(&self.clock.now());
        self.mount(day);
    }

    pub const fn today(&self) -> TodayTotals {
        TodayTotals {
            day: self.totals.day(),
            learning_seconds: self.totals.read(Category::Learning),
            rest_seconds: self.totals.read(Category::Rest),
        }
    }

    /// Zeroes today's totals. Running sessions keep their own numbers.
    pub fn reset_today(&mut self) {
        self.totals.reset();
    }

    pub const fn totals(&self) -> &DailyTotals {
        &self.totals
    }

    pub const fn rest_mode(&self) -> RestMode {
        self.rest_mode
    }

    pub fn set_rest_mode(&mut self, mode: RestMode) {
        if self.rest_mode != mode {
            debug!(from = ?self.rest_mode, to = ?mode, "rest mode switched");
            self.rest_mode = mode;
        }
    }

    /// The countdown for a card.
    pub const fn countdown(&self, category: Category) -> &CountdownEngine {
        match category {
            Category::Learning => &self.learning,
            Category::Rest => &self.rest,
        }
    }

    pub fn start_countdown(
        &mut self,
        category: Category,
        minutes: i64,
    ) -> Result<TickHandle, EngineError> {
        let now = self.clock.now();
        self.countdown_mut(category).start(minutes, now)
    }

    pub fn tick_countdown(&mut self, category: Category, handle: TickHandle) -> Option<Credit> {
        let now = self.clock.now();
        let credit = self.countdown_mut(category).tick(handle, now);
        self.settle(credit)
    }

    pub fn stop_countdown(&mut self, category: Category) -> Option<Credit> {
        let now = self.clock.now();
        let credit = self.countdown_mut(category).stop(now);
        self.settle(credit)
    }

    pub const fn video_rest(&self) -> &PlayerEngine {
        &self.video_rest
    }

    /// Starts a video rest session; see [`PlayerEngine::start`].
    pub fn start_video_rest(&mut self, input: &str) -> Result<VideoId, ValidationError> {
        self.video_rest.start(input)
    }

    /// Forwards a player signal to the video rest engine.
    pub fn player_signal(&mut self, signal: PlayerSignal, player: &dyn Player) -> Option<Credit> {
        let credit = self.video_rest.handle(signal, player);
        self.settle(credit)
    }

    pub fn poll_video_rest(&mut self, handle: TickHandle, player: &dyn Player) {
        self.video_rest.poll(handle, player);
    }

    pub fn stop_video_rest(&mut self, player: &mut dyn Player) -> Option<Credit> {
        let credit = self.video_rest.stop(player);
        self.settle(credit)
    }

    /// Cancels every live tick; used when the host goes away.
    pub fn teardown(&mut self) {
        self.learning.teardown();
        self.rest.teardown();
        self.video_rest.teardown();
    }

    fn countdown_mut(&mut self, category: Category) -> &mut CountdownEngine {
        match category {
            Category::Learning => &mut self.learning,
            Category::Rest => &mut self.rest,
        }
    }

    fn settle(&mut self, credit: Option<Credit>) -> Option<Credit> {
        let credit = credit?;
        let total = self.totals.add_seconds(credit.category, credit.seconds);
        debug!(category = %credit.category, seconds = credit.seconds, total, "credited");
        if credit.completed {
            self.notifier
                .session_completed(credit.category, credit.seconds);
        }
        Some(credit)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::clock::tests::ManualClock;
    use crate::countdown::CountdownState;
    use crate::player::PlaybackState;
    use crate::player::tests::FakePlayer;
    use crate::totals::MemoryStorage;

    type Log = Rc<RefCell<Vec<(Category, u64)>>>;

    struct RecordingNotifier(Log);

    impl Notifier for RecordingNotifier {
        fn session_completed(&mut self, category: Category, seconds: u64) {
            self.0.borrow_mut().push((category, seconds));
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-15T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn fixture(storage: MemoryStorage) -> (Orchestrator, ManualClock, Log) {
        let clock = ManualClock::new(t0());
        let log = Log::default();
        let mut orchestrator = Orchestrator::new(
            DailyTotals::new(Box::new(storage), "lr"),
            Box::new(clock.clone()),
            Box::new(RecordingNotifier(log.clone())),
        );
        orchestrator.mount("2025-01-15".parse().unwrap());
        (orchestrator, clock, log)
    }

    #[test]
    fn learning_countdown_completes_and_notifies_once() {
        let (mut orchestrator, clock, log) = fixture(MemoryStorage::new());
        let handle = orchestrator
            .start_countdown(Category::Learning, 25)
            .unwrap();
        assert_eq!(orchestrator.countdown(Category::Learning).target_seconds(), 1500);

        // Tick every 250ms for the first few seconds, then jump ahead.
        for _ in 0..8 {
            clock.advance(Duration::milliseconds(250));
            assert!(orchestrator.tick_countdown(Category::Learning, handle).is_none());
        }
        clock.set(t0() + Duration::seconds(1500));
        let credit = orchestrator
            .tick_countdown(Category::Learning, handle)
            .unwrap();
        assert_eq!(credit.seconds, 1500);

        // A tick already queued before completion changes nothing.
        clock.advance(Duration::milliseconds(250));
        assert!(orchestrator.tick_countdown(Category::Learning, handle).is_none());

        assert_eq!(
            orchestrator.countdown(Category::Learning).state(),
            CountdownState::Done
        );
        assert_eq!(orchestrator.today().learning_seconds, 1500);
        assert_eq!(*log.borrow(), vec![(Category::Learning, 1500)]);
    }

    #[test]
    fn stopping_credits_elapsed_without_notifying() {
        let (mut orchestrator, clock, log) = fixture(MemoryStorage::new());
        orchestrator.start_countdown(Category::Rest, 5).unwrap();

        clock.advance(Duration::seconds(95));
        let credit = orchestrator.stop_countdown(Category::Rest).unwrap();
        assert_eq!(credit.seconds, 95);
        assert!(orchestrator.stop_countdown(Category::Rest).is_none());

        assert_eq!(orchestrator.today().rest_seconds, 95);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn video_rest_stop_then_end_credits_watched_time_once() {
        let (mut orchestrator, _clock, log) = fixture(MemoryStorage::new());
        orchestrator.set_rest_mode(RestMode::Video);
        let id = orchestrator
            .start_video_rest("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");

        let mut player = FakePlayer::with_duration(212.0);
        orchestrator.player_signal(PlayerSignal::Ready, &player);
        player.play_video();
        orchestrator.player_signal(PlayerSignal::Play, &player);
        orchestrator.player_signal(PlayerSignal::StateChange(1), &player);

        player.position = 50.0;
        let handle = orchestrator.video_rest().poll_handle().unwrap();
        orchestrator.poll_video_rest(handle, &player);
        assert_eq!(orchestrator.video_rest().remaining_seconds(), Some(162));

        let credit = orchestrator.stop_video_rest(&mut player).unwrap();
        assert_eq!(credit.seconds, 50);
        assert!(orchestrator.video_rest().credited());

        player.position = 212.0;
        assert!(orchestrator.player_signal(PlayerSignal::End, &player).is_none());
        assert!(
            orchestrator
                .player_signal(PlayerSignal::StateChange(0), &player)
                .is_none()
        );

        assert_eq!(orchestrator.today().rest_seconds, 50);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn video_rest_natural_end_credits_duration_and_notifies() {
        let (mut orchestrator, _clock, log) = fixture(MemoryStorage::new());
        orchestrator
            .start_video_rest("https://youtu.be/dQw4w9WgXcQ")
            .unwrap();
        let mut player = FakePlayer::with_duration(212.0);
        orchestrator.player_signal(PlayerSignal::Play, &player);

        player.position = 212.0;
        orchestrator.player_signal(PlayerSignal::End, &player);
        orchestrator.player_signal(PlayerSignal::StateChange(0), &player);

        assert_eq!(orchestrator.today().rest_seconds, 212);
        assert_eq!(*log.borrow(), vec![(Category::Rest, 212)]);
    }

    #[test]
    fn invalid_video_reference_enters_error() {
        let (mut orchestrator, _clock, _log) = fixture(MemoryStorage::new());
        orchestrator.set_rest_mode(RestMode::Video);

        let err = orchestrator.start_video_rest("not a url").unwrap_err();
        assert_eq!(orchestrator.video_rest().state(), PlaybackState::Error);
        assert_eq!(
            orchestrator.video_rest().status(),
            Some(err.to_string().as_str())
        );
        assert!(orchestrator.video_rest().video_id().is_none());
    }

    #[test]
    fn reset_today_leaves_running_session_alone() {
        let storage = MemoryStorage::new()
            .with_entry("lr:2025-01-15:learnSec", "600")
            .with_entry("lr:2025-01-15:breakSec", "120");
        let (mut orchestrator, clock, _log) = fixture(storage);
        assert_eq!(orchestrator.today().rest_seconds, 120);

        orchestrator.start_countdown(Category::Learning, 10).unwrap();
        clock.advance(Duration::seconds(30));
        let handle = orchestrator
            .countdown(Category::Learning)
            .tick_handle()
            .unwrap();
        orchestrator.tick_countdown(Category::Learning, handle);

        orchestrator.reset_today();
        assert_eq!(orchestrator.today().learning_seconds, 0);
        assert_eq!(orchestrator.today().rest_seconds, 0);
        let learning = orchestrator.countdown(Category::Learning);
        assert_eq!(learning.state(), CountdownState::Running);
        assert_eq!(learning.remaining_seconds(), 570);
    }

    #[test]
    fn rest_modes_are_independent() {
        let (mut orchestrator, clock, _log) = fixture(MemoryStorage::new());
        orchestrator.start_countdown(Category::Rest, 5).unwrap();
        orchestrator.set_rest_mode(RestMode::Video);
        orchestrator.start_video_rest("dQw4w9WgXcQ").unwrap();
        orchestrator.set_rest_mode(RestMode::Plain);

        clock.advance(Duration::seconds(20));
        assert_eq!(
            orchestrator.countdown(Category::Rest).state(),
            CountdownState::Running
        );
        assert_eq!(orchestrator.video_rest().state(), PlaybackState::Idle);
    }

    #[test]
    fn credits_before_mount_are_reconciled() {
        let clock = ManualClock::new(t0());
        let mut orchestrator = Orchestrator::new(
            DailyTotals::new(
                Box::new(MemoryStorage::new().with_entry("lr:2025-01-15:learnSec", "60")),
                "lr",
            ),
            Box::new(clock.clone()),
            Box::new(crate::notify::NullNotifier),
        );

        orchestrator.start_countdown(Category::Learning, 1).unwrap();
        clock.advance(Duration::seconds(45));
        orchestrator.stop_countdown(Category::Learning);
        assert_eq!(orchestrator.today().learning_seconds, 0);
        assert_eq!(orchestrator.today().day, None);

        orchestrator.mount("2025-01-15".parse().unwrap());
        assert_eq!(orchestrator.today().learning_seconds, 105);
    }

    #[test]
    fn teardown_cancels_all_ticks() {
        let (mut orchestrator, _clock, _log) = fixture(MemoryStorage::new());
        orchestrator.start_countdown(Category::Learning, 1).unwrap();
        orchestrator.start_countdown(Category::Rest, 1).unwrap();
        orchestrator.start_video_rest("dQw4w9WgXcQ").unwrap();
        let player = FakePlayer::with_duration(60.0);
        orchestrator.player_signal(PlayerSignal::Play, &player);

        orchestrator.teardown();
        assert!(orchestrator.countdown(Category::Learning).tick_handle().is_none());
        assert!(orchestrator.countdown(Category::Rest).tick_handle().is_none());
        assert!(orchestrator.video_rest().poll_handle().is_none());
    }
}
