//! Reset command for zeroing today's totals.

use std::io::Write;

use anyhow::Result;
use lr_core::Orchestrator;
use tracing::info;

pub fn run<W: Write>(writer: &mut W, session: &mut Orchestrator) -> Result<()> {
    session.reset_today();
    let today = session.today();
    info!(day = ?today.day, "totals reset");

    match today.day {
        Some(day) => writeln!(writer, "Reset totals for {day}.")?,
        None => writeln!(writer, "Reset totals.")?,
    }
    Ok(())
}
