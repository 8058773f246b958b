//! Completion cue capability.

use crate::types::Category;

/// Announces that a session ran to its natural end.
///
/// Implementations are fire-and-forget: they must swallow their own failures
/// (missing audio device, denied notification permission, closed terminal).
pub trait Notifier {
    fn session_completed(&mut self, category: Category, seconds: u64);
}

/// A notifier that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn session_completed(&mut self, _category: Category, _seconds: u64) {}
}
