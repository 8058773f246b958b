//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Namespace for counter keys.
    pub key_prefix: String,
    /// Default learning session length in minutes.
    pub learn_minutes: u32,
    /// Default plain rest length in minutes.
    pub rest_minutes: u32,
    /// Countdown tick and player poll cadence in milliseconds.
    pub tick_interval_ms: u64,
    /// Ring the terminal bell when a session completes.
    pub bell: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("key_prefix", &self.key_prefix)
            .field("learn_minutes", &self.learn_minutes)
            .field("rest_minutes", &self.rest_minutes)
            .field("tick_interval_ms", &self.tick_interval_ms)
            .field("bell", &self.bell)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("lr.db"),
            key_prefix: "lr".to_string(),
            learn_minutes: 25,
            rest_minutes: 5,
            tick_interval_ms: 250,
            bell: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (LR_*)
        figment = figment.merge(Env::prefixed("LR_"));

        figment.extract()
    }

    /// Tick cadence, never shorter than 10ms.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(10))
    }
}

/// Returns the platform-specific config directory for lr.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lr"))
}

/// Returns the platform-specific data directory for lr.
///
/// On Linux: `~/.local/share/lr`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("lr"))
}
