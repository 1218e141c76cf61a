//! # Backup and recovery of the two lists.
//!
//! After every mutation the engine snapshots the affected list(s) through a
//! [`BackupStore`]; moderators reload them after a restart with `fillqueue` /
//! `fillsubs`.
//!
//! ```text
//!   Engine ── snapshot(Main, entries) ──► backuplog.csv      (marker kept in place)
//!          ── snapshot(Subs, entries) ──► backupsublog.csv
//!   restore(list) ◄── file order, no deduplication
//! ```
//!
//! The main file records where the sub-list marker stood, so a line whose
//! sub-list was up next comes back that way.

pub mod codec;
mod file;
mod memory;

pub use file::{FileBackup, MAIN_FILE, SUBS_FILE};
pub use memory::MemoryBackup;

use crate::error::BackupError;
use crate::queue::{Entry, ListKind};

/// Durable copy of each list.
pub trait BackupStore: Send + 'static {
    /// Overwrites the stored copy of `list`.
    fn snapshot(&mut self, list: ListKind, entries: &[Entry]) -> Result<(), BackupError>;

    /// Reads the stored copy of `list` in order; missing means empty.
    fn restore(&self, list: ListKind) -> Result<Vec<Entry>, BackupError>;
}
