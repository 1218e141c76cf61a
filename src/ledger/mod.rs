//! # Play history ledger.
//!
//! The [`Ledger`] is the durable record of past plays, keyed by handle. The
//! engine uses it for two things:
//! - the **variety gate**: "has this handle played within the window?"
//! - **recording** every completed turn.
//!
//! ## Recency view
//! Recency questions are answered from the *history view*: the records present
//! when the ledger was opened (pruned once at engine startup) plus anything a
//! moderator back-filled. Turns recorded while the session runs are written
//! durably but stay out of the view; the session's
//! [`PlayedSet`](crate::PlayedSet) already covers them.
//!
//! ```text
//!   open ──► history view ◄── backfill()
//!                │
//!   has_recent_play()          append() ──► durable store only
//! ```
//!
//! ## Implementations
//! - [`MemoryLedger`]: everything in process memory (tests, ephemeral sessions).
//! - [`SqliteLedger`]: `players(handle, display_name, played_on)` table, with an
//!   optional CSV journal mirroring every write (feature `sqlite`).

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;
mod window;

use chrono::NaiveDate;

pub use memory::MemoryLedger;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLedger;
pub use window::VarietyWindow;

use crate::error::LedgerError;
use crate::queue::{Entrant, normalize_handle};

/// Date format used by every durable representation.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One completed turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerRecord {
    pub handle: String,
    pub display_name: String,
    pub played_on: NaiveDate,
}

impl LedgerRecord {
    pub fn new(handle: &str, display_name: impl Into<String>, played_on: NaiveDate) -> Self {
        Self {
            handle: normalize_handle(handle),
            display_name: display_name.into(),
            played_on,
        }
    }

    pub fn for_entrant(entrant: &Entrant, played_on: NaiveDate) -> Self {
        Self::new(entrant.handle(), entrant.display_name(), played_on)
    }
}

/// Durable history of plays.
pub trait Ledger: Send + 'static {
    /// Whether the history view holds a play of `handle` inside `window`.
    fn has_recent_play(
        &self,
        handle: &str,
        window: VarietyWindow,
        today: NaiveDate,
    ) -> Result<bool, LedgerError>;

    /// Durably records a completed turn of the running session.
    fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError>;

    /// Drops every record at or before `window.cutoff(today)`; returns how many.
    fn prune_older_than(
        &mut self,
        window: VarietyWindow,
        today: NaiveDate,
    ) -> Result<usize, LedgerError>;

    /// Durably records a play and adds it to the history view.
    fn backfill(&mut self, record: LedgerRecord) -> Result<(), LedgerError>;

    /// Deletes the records of whoever matches `needle` (handle first, then display name).
    fn remove(&mut self, needle: &str) -> Result<Option<LedgerRecord>, LedgerError>;

    /// Whether `handle` appears in the history view.
    fn is_logged(&self, handle: &str) -> bool;

    /// The history view, oldest first.
    fn history(&self) -> Vec<LedgerRecord>;
}

/// What a removal matched on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MatchedOn {
    Handle,
    DisplayName,
}

impl MatchedOn {
    /// Whether `candidate` shares the key of `key` under this match.
    pub(crate) fn same_key(&self, candidate: &LedgerRecord, key: &LedgerRecord) -> bool {
        match self {
            MatchedOn::Handle => candidate.handle == key.handle,
            MatchedOn::DisplayName => candidate
                .display_name
                .eq_ignore_ascii_case(&key.display_name),
        }
    }
}

/// In-memory history view shared by the ledger implementations.
#[derive(Clone, Debug, Default)]
pub(crate) struct History {
    records: Vec<LedgerRecord>,
}

impl History {
    pub(crate) fn new(records: Vec<LedgerRecord>) -> Self {
        Self { records }
    }

    pub(crate) fn push(&mut self, record: LedgerRecord) {
        self.records.push(record);
    }

    pub(crate) fn contains(&self, handle: &str) -> bool {
        let handle = normalize_handle(handle);
        self.records.iter().any(|r| r.handle == handle)
    }

    pub(crate) fn has_recent(&self, handle: &str, window: VarietyWindow, today: NaiveDate) -> bool {
        let handle = normalize_handle(handle);
        self.records
            .iter()
            .any(|r| r.handle == handle && window.is_recent(r.played_on, today))
    }

    /// Keeps records strictly after `cutoff`; returns how many were dropped.
    pub(crate) fn prune(&mut self, cutoff: NaiveDate) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.played_on > cutoff);
        before - self.records.len()
    }

    /// Resolves `needle` to a key without removing anything.
    pub(crate) fn resolve(&self, needle: &str) -> Option<(LedgerRecord, MatchedOn)> {
        let handle = normalize_handle(needle);
        if let Some(r) = self.records.iter().find(|r| r.handle == handle) {
            return Some((r.clone(), MatchedOn::Handle));
        }
        self.records
            .iter()
            .find(|r| r.display_name.eq_ignore_ascii_case(needle.trim()))
            .map(|r| (r.clone(), MatchedOn::DisplayName))
    }

    /// Removes every record sharing the key of `record`.
    pub(crate) fn remove_matching(&mut self, record: &LedgerRecord, on: MatchedOn) {
        self.records.retain(|r| !on.same_key(r, record));
    }

    pub(crate) fn records(&self) -> &[LedgerRecord] {
        &self.records
    }
}
