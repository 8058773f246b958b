//! Video rest command: rest lasts as long as a video plays.
//!
//! The terminal drives a [`HeadlessPlayer`] in place of an embedded one. Its
//! signals flow through the orchestrator exactly as an embedded player's
//! would, and the poll ticker follows the engine's live handle so polling
//! stops whenever playback does.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use lr_core::{
    Credit, Orchestrator, PlaybackSnapshot, PlaybackState, Player, PlayerEngine, RestMode,
    TickHandle,
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use super::util::{credit_summary, format_clock, status_line};
use crate::headless::HeadlessPlayer;
use crate::input::{self, SessionCommand};
use crate::ticker::{self, TickTask};

/// Options for a video rest session.
#[derive(Debug, Clone)]
pub struct VideoRest {
    /// Video ID or link as typed.
    pub input: String,
    /// Length of the video in seconds.
    pub duration_seconds: u32,
    /// Open the watch page in the browser.
    pub open: bool,
}

pub async fn run<W: Write>(
    writer: &mut W,
    session: &mut Orchestrator,
    options: &VideoRest,
    period: Duration,
) -> Result<()> {
    session.set_rest_mode(RestMode::Video);
    let id = session.start_video_rest(&options.input)?;

    let url = id.watch_url();
    writeln!(writer, "Resting with {url}")?;
    if options.open {
        if let Err(err) = webbrowser::open(&url) {
            warn!(error = %err, url = %url, "failed to open browser");
        }
    }
    writeln!(
        writer,
        "Type `pause`, `play` or `stop`, or press Ctrl-C to end early."
    )?;

    let mut player = HeadlessPlayer::new(f64::from(options.duration_seconds));
    player.play_video();

    let (ticks_tx, mut ticks) = mpsc::unbounded_channel();
    let mut task = None;
    let mut credit = forward(session, &mut player, &mut task, period, &ticks_tx);
    let mut lines = input::spawn_line_reader();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    status_line(writer, &progress(&session.video_rest().snapshot()))?;

    while !is_over(session.video_rest()) {
        tokio::select! {
            Some(handle) = ticks.recv() => {
                session.poll_video_rest(handle, &player);
                player.poll_end();
            }
            line = lines.recv(), if stdin_open => match line {
                None => {
                    debug!("stdin closed; video keeps playing");
                    stdin_open = false;
                }
                Some(line) => match line.parse::<SessionCommand>() {
                    Ok(SessionCommand::Play) => player.play_video(),
                    Ok(SessionCommand::Pause) => player.pause_video(),
                    Ok(SessionCommand::Stop) => {
                        task = None;
                        let stopped = session.stop_video_rest(&mut player);
                        credit = credit.or(stopped);
                    }
                    Err(err) => warn!("{err}"),
                },
            },
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                task = None;
                let stopped = session.stop_video_rest(&mut player);
                credit = credit.or(stopped);
            }
        }
        let delivered = forward(session, &mut player, &mut task, period, &ticks_tx);
        credit = credit.or(delivered);
        status_line(writer, &progress(&session.video_rest().snapshot()))?;
    }
    drop(task);
    writeln!(writer)?;

    let engine = session.video_rest();
    if engine.state() == PlaybackState::Error {
        anyhow::bail!("{}", engine.status().unwrap_or("video playback failed"));
    }
    info!(credited = engine.credited(), "video rest finished");
    writeln!(writer, "{}", credit_summary(credit))?;
    Ok(())
}

/// Delivers pending player signals and brings the poll ticker in line with
/// the engine.
fn forward(
    session: &mut Orchestrator,
    player: &mut HeadlessPlayer,
    task: &mut Option<TickTask>,
    period: Duration,
    ticks: &UnboundedSender<TickHandle>,
) -> Option<Credit> {
    let mut credit = None;
    for signal in player.take_signals() {
        let applied = session.player_signal(signal, &*player);
        credit = credit.or(applied);
    }
    ticker::sync(task, session.video_rest().poll_handle(), period, ticks);
    credit
}

const fn is_over(engine: &PlayerEngine) -> bool {
    matches!(engine.state(), PlaybackState::Ended | PlaybackState::Error)
}

fn progress(snapshot: &PlaybackSnapshot) -> String {
    let remaining = snapshot
        .remaining_seconds
        .map_or_else(|| "--:--".to_string(), format_clock);
    match snapshot.state {
        PlaybackState::Paused => format!("rest (video)  {remaining} remaining [paused]"),
        PlaybackState::Ended => format!("rest (video)  {remaining} remaining [ended]"),
        _ => format!("rest (video)  {remaining} remaining"),
    }
}
