//! Periodic tick tasks for engine handles.
//!
//! Each live engine handle gets one spawned interval task that feeds the
//! handle into the host loop's channel. Dropping the [`TickTask`] aborts the
//! task, which makes the drop the single cancellation path for every exit
//! (stop, completion, error, shutdown).

use std::time::Duration;

use lr_core::TickHandle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// A spawned tick source for one engine handle.
#[derive(Debug)]
pub struct TickTask {
    handle: TickHandle,
    task: JoinHandle<()>,
}

impl TickTask {
    /// Spawns a task that sends `handle` every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(handle: TickHandle, period: Duration, ticks: UnboundedSender<TickHandle>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if ticks.send(handle).is_err() {
                    break;
                }
            }
        });
        Self { handle, task }
    }

    pub const fn handle(&self) -> TickHandle {
        self.handle
    }
}

impl Drop for TickTask {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Brings `slot` in line with the engine's live handle.
///
/// Keeps the running task when the handle is unchanged, replaces it when the
/// engine re-armed, and drops it when the engine no longer wants ticks.
pub fn sync(
    slot: &mut Option<TickTask>,
    wanted: Option<TickHandle>,
    period: Duration,
    ticks: &UnboundedSender<TickHandle>,
) {
    let current = slot.as_ref().map(TickTask::handle);
    if current == wanted {
        return;
    }
    *slot = wanted.map(|handle| TickTask::spawn(handle, period, ticks.clone()));
}
