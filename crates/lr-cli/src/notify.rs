//! Terminal completion cue.

use std::io::Write;

use lr_core::{Category, Notifier};
use tracing::debug;

/// Rings the terminal bell and prints a line to stderr when a session ends.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    bell: bool,
}

impl TerminalNotifier {
    pub const fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl Notifier for TerminalNotifier {
    fn session_completed(&mut self, category: Category, seconds: u64) {
        let mut stderr = std::io::stderr().lock();
        let bell = if self.bell { "\x07" } else { "" };
        let label = match category {
            Category::Learning => "Learning session",
            Category::Rest => "Rest",
        };
        if let Err(err) = writeln!(stderr, "{bell}{label} complete.").and_then(|()| stderr.flush()) {
            debug!(error = %err, seconds, "completion cue failed");
        }
    }
}
