//! Learn and plain rest commands: a countdown in the terminal.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use lr_core::{Category, CountdownSnapshot, CountdownState, Orchestrator};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::util::{credit_summary, format_clock, status_line};
use crate::input::{self, SessionCommand};
use crate::ticker::{self, TickTask};

/// Runs a countdown until it completes, the user types `stop`, or Ctrl-C.
pub async fn run<W: Write>(
    writer: &mut W,
    session: &mut Orchestrator,
    category: Category,
    minutes: i64,
    period: Duration,
) -> Result<()> {
    let handle = session.start_countdown(category, minutes)?;
    let (ticks_tx, mut ticks) = mpsc::unbounded_channel();
    let mut task = Some(TickTask::spawn(handle, period, ticks_tx.clone()));
    let mut lines = input::spawn_line_reader();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    writeln!(
        writer,
        "{} for {}. Type `stop` or press Ctrl-C to end early.",
        label(category),
        format_clock(session.countdown(category).target_seconds())
    )?;
    status_line(writer, &progress(&session.countdown(category).snapshot()))?;

    let credit = loop {
        tokio::select! {
            Some(handle) = ticks.recv() => {
                let credit = session.tick_countdown(category, handle);
                ticker::sync(&mut task, session.countdown(category).tick_handle(), period, &ticks_tx);
                let snapshot = session.countdown(category).snapshot();
                status_line(writer, &progress(&snapshot))?;
                if snapshot.state == CountdownState::Done {
                    writeln!(writer)?;
                    writeln!(writer, "{} complete.", label(category))?;
                    break credit;
                }
            }
            line = lines.recv(), if stdin_open => match line {
                None => {
                    debug!("stdin closed; countdown continues");
                    stdin_open = false;
                }
                Some(line) => match line.parse::<SessionCommand>() {
                    Ok(SessionCommand::Stop) => {
                        task = None;
                        writeln!(writer)?;
                        writeln!(writer, "{} stopped.", label(category))?;
                        break session.stop_countdown(category);
                    }
                    Ok(command) => debug!(?command, "not a countdown command"),
                    Err(err) => warn!("{err}"),
                },
            },
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                task = None;
                writeln!(writer)?;
                writeln!(writer, "{} interrupted.", label(category))?;
                break session.stop_countdown(category);
            }
        }
    };
    drop(task);

    writeln!(writer, "{}", credit_summary(credit))?;
    Ok(())
}

const fn label(category: Category) -> &'static str {
    match category {
        Category::Learning => "Learning session",
        Category::Rest => "Rest",
    }
}

fn progress(snapshot: &CountdownSnapshot) -> String {
    format!(
        "{}  {} remaining",
        snapshot.category,
        format_clock(snapshot.remaining_seconds)
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use lr_core::CountdownEngine;

    use super::*;

    #[test]
    fn progress_shows_remaining_time() {
        let start = Utc::now();
        let mut engine = CountdownEngine::new(Category::Rest);
        let handle = engine.start(5, start).unwrap();
        assert_eq!(progress(&engine.snapshot()), "rest  05:00 remaining");

        engine.tick(handle, start + Duration::seconds(61));
        assert_eq!(progress(&engine.snapshot()), "rest  03:59 remaining");
    }
}
