use std::sync::Arc;

use tracing::info;
#[cfg(not(feature = "sqlite"))]
use tracing::warn;

use crate::backup::{BackupStore, FileBackup, MemoryBackup};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::LedgerError;
use crate::events::Bus;
use crate::ledger::{Ledger, MemoryLedger};

use super::engine::Engine;

/// Builder for constructing an [`Engine`] with optional collaborators.
///
/// Anything not supplied is derived from the [`Config`]:
/// - ledger: `SqliteLedger` at `ledger_path` (with `journal_path`), else in memory
/// - backup: `FileBackup` in `backup_dir`, else in memory
/// - clock: [`SystemClock`]
/// - bus: `Bus::new(bus_capacity)`
pub struct EngineBuilder {
    cfg: Config,
    ledger: Option<Box<dyn Ledger>>,
    backup: Option<Box<dyn BackupStore>>,
    clock: Option<Arc<dyn Clock>>,
    bus: Option<Bus>,
}

impl EngineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ledger: None,
            backup: None,
            clock: None,
            bus: None,
        }
    }

    pub fn with_ledger(mut self, ledger: impl Ledger) -> Self {
        self.ledger = Some(Box::new(ledger));
        self
    }

    pub fn with_backup(mut self, backup: impl BackupStore) -> Self {
        self.backup = Some(Box::new(backup));
        self
    }

    /// Overrides the time source (tests drive a `ManualClock`).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Publishes on an existing bus instead of creating one.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the engine and prunes the ledger once to the variety window.
    ///
    /// # Errors
    /// Opening or pruning the ledger failed.
    pub fn build(self) -> Result<Engine, LedgerError> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let mut ledger = match self.ledger {
            Some(ledger) => ledger,
            None => default_ledger(&self.cfg)?,
        };

        let pruned = ledger.prune_older_than(self.cfg.variety_window(), clock.today())?;
        info!(pruned, window_days = self.cfg.variety_window_days, "ledger pruned");

        let backup: Box<dyn BackupStore> = match (self.backup, &self.cfg.backup_dir) {
            (Some(backup), _) => backup,
            (None, Some(dir)) => Box::new(FileBackup::new(dir)),
            (None, None) => Box::new(MemoryBackup::new()),
        };
        let bus = self
            .bus
            .unwrap_or_else(|| Bus::new(self.cfg.bus_capacity_clamped()));

        Ok(Engine::from_parts(self.cfg, ledger, backup, clock, bus))
    }
}

#[cfg(feature = "sqlite")]
fn default_ledger(cfg: &Config) -> Result<Box<dyn Ledger>, LedgerError> {
    let Some(path) = &cfg.ledger_path else {
        return Ok(Box::new(MemoryLedger::new()));
    };
    let mut ledger = crate::ledger::SqliteLedger::open(path)?;
    if let Some(journal) = &cfg.journal_path {
        ledger = ledger.with_journal(journal);
    }
    Ok(Box::new(ledger))
}

#[cfg(not(feature = "sqlite"))]
fn default_ledger(cfg: &Config) -> Result<Box<dyn Ledger>, LedgerError> {
    if cfg.ledger_path.is_some() {
        warn!("ledger_path is set but the sqlite feature is off; using an in-memory ledger");
    }
    Ok(Box::new(MemoryLedger::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ledger::LedgerRecord;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_build_prunes_ledger_to_window() {
        let ledger = MemoryLedger::with_records(vec![
            LedgerRecord::new("old", "Old", day(1)),
            LedgerRecord::new("fresh", "Fresh", day(9)),
        ]);
        let engine = EngineBuilder::new(Config::default())
            .with_ledger(ledger)
            .with_clock(Arc::new(ManualClock::new(day(10))))
            .build()
            .unwrap();

        let handles: Vec<String> = engine
            .ledger()
            .history()
            .into_iter()
            .map(|r| r.handle)
            .collect();
        assert_eq!(handles, vec!["fresh".to_string()]);
    }

    #[test]
    fn test_build_uses_config_toggles_and_defaults() {
        let mut cfg = Config::default();
        cfg.toggles.open = true;
        let engine = EngineBuilder::new(cfg).build().unwrap();
        assert!(engine.toggles().open);
        assert!(engine.store().is_empty());
    }
}
