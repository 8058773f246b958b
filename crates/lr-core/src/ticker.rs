//! Ownership of periodic engine ticks.
//!
//! An engine never owns a timer itself. It hands out a [`TickHandle`] when it
//! wants periodic work and the host schedules ticks carrying that handle. Every
//! exit path clears the slot, after which ticks with the old handle are ignored,
//! so a tick that was already in flight when a session stopped cannot mutate
//! state or credit totals a second time.

use std::time::Duration;

/// Cadence for countdown recomputation and player polling.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Opaque identity of one armed periodic activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Holds at most one live tick handle for an engine.
#[derive(Debug, Default)]
pub struct TickSlot {
    issued: u64,
    active: Option<TickHandle>,
}

impl TickSlot {
    /// Arms a fresh handle, replacing any live one.
    pub fn arm(&mut self) -> TickHandle {
        self.issued += 1;
        let handle = TickHandle(self.issued);
        self.active = Some(handle);
        handle
    }

    /// Cancels the live handle, if any.
    pub fn cancel(&mut self) -> Option<TickHandle> {
        self.active.take()
    }

    /// Whether `handle` is the live one.
    pub fn is_live(&self, handle: TickHandle) -> bool {
        self.active == Some(handle)
    }

    /// The live handle, if any.
    pub const fn active(&self) -> Option<TickHandle> {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_invalidates_previous_handle() {
        let mut slot = TickSlot::default();
        let first = slot.arm();
        let second = slot.arm();

        assert_ne!(first, second);
        assert!(!slot.is_live(first));
        assert!(slot.is_live(second));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut slot = TickSlot::default();
        let handle = slot.arm();

        assert_eq!(slot.cancel(), Some(handle));
        assert_eq!(slot.cancel(), None);
        assert!(!slot.is_live(handle));
        assert!(slot.active().is_none());
    }
}
