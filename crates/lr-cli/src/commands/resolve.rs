//! Resolve command for checking a video reference.

use std::io::Write;

use anyhow::Result;

pub fn run<W: Write>(writer: &mut W, input: &str) -> Result<()> {
    let id = lr_core::resolve(input)?;
    writeln!(writer, "{id}")?;
    writeln!(writer, "{}", id.watch_url())?;
    Ok(())
}
