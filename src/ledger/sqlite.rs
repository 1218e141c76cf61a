//! `SQLite`-backed ledger.
//!
//! Schema: `players(handle TEXT, display_name TEXT, played_on TEXT)` where
//! `played_on` is an ISO `YYYY-MM-DD` date, so date comparisons are plain text
//! comparisons in SQL.
//!
//! Every durable write can also be mirrored to an append-only CSV journal
//! (`handle,display_name,played_on`), a human-readable trail that survives a
//! damaged database file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use tracing::{debug, info, warn};

use crate::error::LedgerError;

use super::{DATE_FORMAT, History, Ledger, LedgerRecord, MatchedOn, VarietyWindow};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS players (
        handle       TEXT NOT NULL,
        display_name TEXT NOT NULL,
        played_on    TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_players_handle ON players(handle);
";

/// Durable ledger stored in a `SQLite` database.
#[derive(Debug)]
pub struct SqliteLedger {
    conn: Connection,
    history: History,
    journal: Option<PathBuf>,
}

impl SqliteLedger {
    /// Opens (or creates) the database at `path` and loads the history view.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let conn = Connection::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "opened ledger database");
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Mirrors every durable write to a CSV journal at `path`.
    #[must_use]
    pub fn with_journal(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal = Some(path.into());
        self
    }

    fn from_connection(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute_batch(SCHEMA)?;
        let history = History::new(load_records(&conn)?);
        debug!(records = history.records().len(), "loaded ledger history");
        Ok(Self {
            conn,
            history,
            journal: None,
        })
    }

    fn insert_row(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        self.conn.execute(
            "INSERT INTO players (handle, display_name, played_on) VALUES (?1, ?2, ?3)",
            params![
                record.handle,
                record.display_name,
                record.played_on.format(DATE_FORMAT).to_string()
            ],
        )?;
        Ok(())
    }

    fn write_journal(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        let Some(path) = &self.journal else {
            return Ok(());
        };
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([
            record.handle.as_str(),
            record.display_name.as_str(),
            &record.played_on.format(DATE_FORMAT).to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

impl Ledger for SqliteLedger {
    fn has_recent_play(
        &self,
        handle: &str,
        window: VarietyWindow,
        today: NaiveDate,
    ) -> Result<bool, LedgerError> {
        Ok(self.history.has_recent(handle, window, today))
    }

    fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.insert_row(&record)?;
        self.write_journal(&record)
    }

    fn prune_older_than(
        &mut self,
        window: VarietyWindow,
        today: NaiveDate,
    ) -> Result<usize, LedgerError> {
        let cutoff = window.cutoff(today);
        let deleted = self.conn.execute(
            "DELETE FROM players WHERE played_on <= ?1",
            params![cutoff.format(DATE_FORMAT).to_string()],
        )?;
        self.history.prune(cutoff);
        info!(deleted, %cutoff, "pruned ledger");
        Ok(deleted)
    }

    /// The history view follows the database: once the row is committed the
    /// record is visible, even if the journal write then fails.
    fn backfill(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.insert_row(&record)?;
        let journaled = self.write_journal(&record);
        self.history.push(record);
        journaled
    }

    fn remove(&mut self, needle: &str) -> Result<Option<LedgerRecord>, LedgerError> {
        let Some((record, on)) = self.history.resolve(needle) else {
            return Ok(None);
        };
        let deleted = match on {
            MatchedOn::Handle => self
                .conn
                .execute("DELETE FROM players WHERE handle = ?1", params![record.handle])?,
            MatchedOn::DisplayName => self.conn.execute(
                "DELETE FROM players WHERE display_name = ?1 COLLATE NOCASE",
                params![record.display_name],
            )?,
        };
        self.history.remove_matching(&record, on);
        debug!(handle = %record.handle, deleted, "removed ledger records");
        Ok(Some(record))
    }

    fn is_logged(&self, handle: &str) -> bool {
        self.history.contains(handle)
    }

    fn history(&self) -> Vec<LedgerRecord> {
        self.history.records().to_vec()
    }
}

fn load_records(conn: &Connection) -> Result<Vec<LedgerRecord>, LedgerError> {
    let mut stmt =
        conn.prepare("SELECT handle, display_name, played_on FROM players ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (handle, display_name, played_on) = row?;
        match NaiveDate::parse_from_str(&played_on, DATE_FORMAT) {
            Ok(date) => records.push(LedgerRecord::new(&handle, display_name, date)),
            Err(_) => {
                let err = LedgerError::MalformedDate {
                    handle,
                    value: played_on,
                };
                warn!(error = %err, "skipping ledger row");
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_journal_failure_keeps_committed_backfill_visible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let mut ledger = SqliteLedger::open(&path).unwrap().with_journal(dir.path());

        let err = ledger
            .backfill(LedgerRecord::new("carol", "Caz", day(19)))
            .unwrap_err();
        assert_eq!(err.as_label(), "ledger_io");
        assert!(ledger.is_logged("carol"));
        assert!(ledger.has_recent_play("carol", VarietyWindow::days(7), day(20)).unwrap());

        let reopened = SqliteLedger::open(&path).unwrap();
        assert_eq!(reopened.history(), ledger.history());
    }

    #[test]
    fn test_reopen_loads_history_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playerlog.db");
        {
            let mut ledger = SqliteLedger::open(&path).unwrap();
            ledger.append(LedgerRecord::new("old", "Old", day(1))).unwrap();
            ledger.append(LedgerRecord::new("new", "New", day(18))).unwrap();
            // Session appends are not part of the view until reopened.
            assert!(!ledger.is_logged("new"));
        }

        let mut ledger = SqliteLedger::open(&path).unwrap();
        assert!(ledger.is_logged("old"));
        assert!(ledger.is_logged("new"));

        let pruned = ledger.prune_older_than(VarietyWindow::days(7), day(20)).unwrap();
        assert_eq!(pruned, 1);
        assert!(!ledger.is_logged("old"));
        assert!(
            ledger
                .has_recent_play("new", VarietyWindow::days(7), day(20))
                .unwrap()
        );

        drop(ledger);
        let reopened = SqliteLedger::open(&path).unwrap();
        assert_eq!(reopened.history().len(), 1);
    }

    #[test]
    fn test_remove_deletes_durably() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playerlog.db");
        let mut ledger = SqliteLedger::open(&path).unwrap();
        ledger.backfill(LedgerRecord::new("carol", "Caz", day(19))).unwrap();

        let removed = ledger.remove("caz").unwrap().unwrap();
        assert_eq!(removed.handle, "carol");
        drop(ledger);

        assert!(SqliteLedger::open(&path).unwrap().history().is_empty());
    }

    #[test]
    fn test_journal_mirrors_writes() {
        let dir = tempfile::tempdir().unwrap();
        let journal = dir.path().join("log.csv");
        let mut ledger = SqliteLedger::open_in_memory()
            .unwrap()
            .with_journal(&journal);
        ledger.append(LedgerRecord::new("alice", "Ali, B", day(20))).unwrap();
        ledger.append(LedgerRecord::new("bob", "Bob", day(20))).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&journal)
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Ali, B");
        assert_eq!(&rows[1][2], "2024-06-20");
    }
}
