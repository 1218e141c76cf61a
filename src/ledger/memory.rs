use chrono::NaiveDate;

use crate::error::LedgerError;

use super::{History, Ledger, LedgerRecord, VarietyWindow};

/// Process-local ledger.
///
/// Records passed to [`MemoryLedger::with_records`] play the role of what a
/// durable store would hold when opened: they form the initial history view.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    history: History,
    stored: Vec<LedgerRecord>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<LedgerRecord>) -> Self {
        Self {
            history: History::new(records.clone()),
            stored: records,
        }
    }

    /// Everything written, including turns recorded this session.
    pub fn stored(&self) -> &[LedgerRecord] {
        &self.stored
    }
}

impl Ledger for MemoryLedger {
    fn has_recent_play(
        &self,
        handle: &str,
        window: VarietyWindow,
        today: NaiveDate,
    ) -> Result<bool, LedgerError> {
        Ok(self.history.has_recent(handle, window, today))
    }

    fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.stored.push(record);
        Ok(())
    }

    fn prune_older_than(
        &mut self,
        window: VarietyWindow,
        today: NaiveDate,
    ) -> Result<usize, LedgerError> {
        let cutoff = window.cutoff(today);
        let before = self.stored.len();
        self.stored.retain(|r| r.played_on > cutoff);
        self.history.prune(cutoff);
        Ok(before - self.stored.len())
    }

    fn backfill(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.stored.push(record.clone());
        self.history.push(record);
        Ok(())
    }

    fn remove(&mut self, needle: &str) -> Result<Option<LedgerRecord>, LedgerError> {
        let Some((record, on)) = self.history.resolve(needle) else {
            return Ok(None);
        };
        self.history.remove_matching(&record, on);
        self.stored.retain(|r| !on.same_key(r, &record));
        Ok(Some(record))
    }

    fn is_logged(&self, handle: &str) -> bool {
        self.history.contains(handle)
    }

    fn history(&self) -> Vec<LedgerRecord> {
        self.history.records().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_variety_boundary() {
        let window = VarietyWindow::days(7);
        let today = day(20);
        let ledger = MemoryLedger::with_records(vec![
            LedgerRecord::new("old", "Old", day(13)),
            LedgerRecord::new("fresh", "Fresh", day(14)),
        ]);

        assert!(!ledger.has_recent_play("old", window, today).unwrap());
        assert!(ledger.has_recent_play("fresh", window, today).unwrap());
    }

    #[test]
    fn test_session_appends_stay_out_of_history_view() {
        let window = VarietyWindow::days(7);
        let mut ledger = MemoryLedger::new();
        ledger.append(LedgerRecord::new("alice", "A", day(20))).unwrap();

        assert_eq!(ledger.stored().len(), 1);
        assert!(!ledger.has_recent_play("alice", window, day(20)).unwrap());
        assert!(!ledger.is_logged("alice"));
    }

    #[test]
    fn test_backfill_is_visible() {
        let mut ledger = MemoryLedger::new();
        ledger.backfill(LedgerRecord::new("Bob", "B", day(19))).unwrap();
        assert!(ledger.is_logged("bob"));
        assert!(
            ledger
                .has_recent_play("bob", VarietyWindow::days(7), day(20))
                .unwrap()
        );
    }

    #[test]
    fn test_prune_drops_boundary_records() {
        let mut ledger = MemoryLedger::with_records(vec![
            LedgerRecord::new("a", "A", day(10)),
            LedgerRecord::new("b", "B", day(13)),
            LedgerRecord::new("c", "C", day(14)),
        ]);
        let pruned = ledger.prune_older_than(VarietyWindow::days(7), day(20)).unwrap();
        assert_eq!(pruned, 2);
        assert_eq!(ledger.history().len(), 1);
        assert_eq!(ledger.history()[0].handle, "c");
    }

    #[test]
    fn test_remove_by_display_name() {
        let mut ledger = MemoryLedger::with_records(vec![
            LedgerRecord::new("a", "Shared", day(14)),
            LedgerRecord::new("b", "Other", day(15)),
        ]);
        let removed = ledger.remove("shared").unwrap().unwrap();
        assert_eq!(removed.handle, "a");
        assert_eq!(ledger.stored().len(), 1);
        assert!(ledger.remove("nobody").unwrap().is_none());
    }
}
