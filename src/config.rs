//! # Engine configuration.
//!
//! Provides [`Config`], the centralized settings for an [`Engine`](crate::Engine).
//!
//! Config is used in two ways:
//! 1. **Engine creation**: `EngineBuilder::new(config)`
//! 2. **Front-end sizing**: `spawn` reads `request_capacity` for its channel
//!
//! ## Loading
//! [`Config::load`] layers, lowest priority first:
//! 1. [`Config::default`]
//! 2. an optional TOML file
//! 3. `LINEUP_`-prefixed environment variables (`__` separates nested keys,
//!    e.g. `LINEUP_TOGGLES__OPEN=true`)
//!
//! ## Sentinel values
//! - `cooldown_secs = 0` → `next` is never rate limited (at most one year is accepted)
//! - `ledger_path = None` → in-memory ledger (nothing survives a restart)
//! - `backup_dir = None` → in-memory backups

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ledger::VarietyWindow;
use crate::policies::{AdmissionPolicy, DEFAULT_QUEUE_LIMIT, MAX_COOLDOWN, Toggles};

/// Global configuration for the engine.
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling unit conversions across the codebase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum interval between two accepted `next` calls, in seconds.
    pub cooldown_secs: u64,

    /// Main-sequence bound applied while the `limit` toggle is on.
    pub queue_limit: usize,

    /// Length of the variety window in days.
    ///
    /// Also the retention of the ledger: older records are pruned at startup.
    pub variety_window_days: u32,

    /// Directory holding `backuplog.csv` and `backupsublog.csv`.
    pub backup_dir: Option<PathBuf>,

    /// `SQLite` database holding the play history.
    pub ledger_path: Option<PathBuf>,

    /// Optional CSV journal mirroring every ledger write.
    pub journal_path: Option<PathBuf>,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Capacity of the async front-end request queue.
    ///
    /// When full, `submit()` waits and `try_submit()` returns `Full`.
    pub request_capacity: usize,

    /// Initial toggle values.
    pub toggles: Toggles,
}

impl Config {
    /// Loads defaults, then `path` (if given and present), then `LINEUP_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let cfg: Config = figment
            .merge(Env::prefixed("LINEUP_").split("__"))
            .extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the engine cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = MAX_COOLDOWN.as_secs();
        if self.cooldown_secs > max {
            return Err(ConfigError::OutOfRange {
                field: "cooldown_secs",
                value: self.cooldown_secs,
                max,
            });
        }
        Ok(())
    }

    /// Cooldown as a [`Duration`].
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn variety_window(&self) -> VarietyWindow {
        VarietyWindow::days(self.variety_window_days)
    }

    pub fn admission(&self) -> AdmissionPolicy {
        AdmissionPolicy::new(self.queue_limit, self.variety_window())
    }

    /// Bus capacity, clamped to at least 1.
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Request queue capacity, clamped to at least 1.
    pub fn request_capacity_clamped(&self) -> usize {
        self.request_capacity.max(1)
    }
}

impl Default for Config {
    /// Defaults follow the values the bot has always run with:
    /// - `cooldown_secs = 10`
    /// - `queue_limit = 7`
    /// - `variety_window_days = 7`
    /// - no files (in-memory ledger and backups)
    /// - `bus_capacity = 1024`, `request_capacity = 256`
    fn default() -> Self {
        Self {
            cooldown_secs: 10,
            queue_limit: DEFAULT_QUEUE_LIMIT,
            variety_window_days: 7,
            backup_dir: None,
            ledger_path: None,
            journal_path: None,
            bus_capacity: 1024,
            request_capacity: 256,
            toggles: Toggles::default(),
        }
    }
}
