//! Builds the orchestrator the commands run against.

use lr_core::{CounterStorage, DailyTotals, MemoryStorage, Orchestrator, SystemClock};
use lr_db::Database;
use tracing::{debug, warn};

use crate::Config;
use crate::notify::TerminalNotifier;

/// Opens the counter store named by the config.
///
/// Falls back to an in-memory store when the database can't be opened, so a
/// session still runs; its totals are lost on exit.
pub fn open_storage(config: &Config) -> Box<dyn CounterStorage> {
    if let Some(parent) = config.database_path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            warn!(path = %parent.display(), error = %err, "failed to create database directory");
        }
    }

    match Database::open(&config.database_path) {
        Ok(db) => {
            debug!(path = %config.database_path.display(), "opened counter database");
            Box::new(db)
        }
        Err(err) => {
            warn!(
                path = %config.database_path.display(),
                error = %err,
                "counter database unavailable; totals will not persist"
            );
            Box::new(MemoryStorage::new())
        }
    }
}

/// Opens storage and mounts today's totals.
pub fn open(config: &Config) -> Orchestrator {
    let totals = DailyTotals::new(open_storage(config), config.key_prefix.clone());
    let mut session = Orchestrator::new(
        totals,
        Box::new(SystemClock),
        Box::new(TerminalNotifier::new(config.bell)),
    );
    session.mount_today();
    session
}
