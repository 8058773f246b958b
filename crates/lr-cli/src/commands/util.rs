//! Shared utilities for CLI commands.

use std::io::Write;

use anyhow::Result;
use lr_core::Credit;

/// Formats seconds as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Rewrites the current terminal line.
pub fn status_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    write!(writer, "\r\x1b[2K{line}")?;
    writer.flush()?;
    Ok(())
}

/// Describes what a finished session added to the totals.
pub fn credit_summary(credit: Option<Credit>) -> String {
    match credit {
        Some(credit) => format!("{} credited to {}.", format_clock(credit.seconds), credit.category),
        None => "Nothing credited.".to_string(),
    }
}
