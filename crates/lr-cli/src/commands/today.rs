//! Today command for showing the day's totals.

use std::io::Write;

use anyhow::Result;
use lr_core::Orchestrator;

use super::util::format_clock;

pub fn run<W: Write>(writer: &mut W, session: &Orchestrator, json: bool) -> Result<()> {
    let today = session.today();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&today)?)?;
        return Ok(());
    }

    match today.day {
        Some(day) => writeln!(writer, "Today ({day})")?,
        None => writeln!(writer, "Today")?,
    }
    writeln!(writer, "Learning: {}", format_clock(today.learning_seconds))?;
    writeln!(writer, "Rest:     {}", format_clock(today.rest_seconds))?;

    Ok(())
}
