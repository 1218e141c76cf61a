use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::ledger::{Ledger, LedgerRecord};
use crate::policies::{CooldownGuard, RotationState};
use crate::queue::{Entrant, PlayedSet, Popped, QueueStore};

/// One completed turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    /// Who just finished and which list they came from.
    pub done: Popped,
    /// Who is up next, resolving the marker to the sub-list head.
    pub next_up: Option<Entrant>,
    /// Ledger failure recorded after the pop.
    pub warning: Option<EngineError>,
}

/// Result of an accepted `next`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Both lists were empty; the cooldown is armed regardless.
    NoOneInLine,
    /// Someone finished their turn.
    Done(Turn),
}

/// Pops the next entrant behind a cooldown.
#[derive(Clone, Copy, Debug, Default)]
pub struct RotationController {
    guard: CooldownGuard,
}

impl RotationController {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            guard: CooldownGuard::new(cooldown),
        }
    }

    pub fn state(&self, now: Instant) -> RotationState {
        self.guard.state(now)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.guard.remaining(now)
    }

    /// Advances the line.
    ///
    /// # Errors
    /// - [`EngineError::PermissionDenied`] for non-moderators.
    /// - [`EngineError::RateLimited`] while the cooldown is active.
    pub fn next(
        &mut self,
        is_moderator: bool,
        store: &mut QueueStore,
        played: &mut PlayedSet,
        ledger: &mut dyn Ledger,
        now: Instant,
        today: NaiveDate,
    ) -> Result<Advance, EngineError> {
        if !is_moderator {
            return Err(EngineError::PermissionDenied);
        }
        if self.guard.is_cooling(now) {
            debug!(remaining = ?self.guard.remaining(now), "next rejected during cooldown");
            return Err(EngineError::RateLimited);
        }
        self.guard.arm(now);

        let Some(done) = store.pop_next() else {
            return Ok(Advance::NoOneInLine);
        };

        played.insert(done.entrant.handle());
        let warning = ledger
            .append(LedgerRecord::for_entrant(&done.entrant, today))
            .err()
            .map(|err| {
                warn!(handle = %done.entrant.handle(), error = %err, "failed to record turn");
                EngineError::from(err)
            });

        Ok(Advance::Done(Turn {
            next_up: store.next_up().cloned(),
            done,
            warning,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::ledger::{MemoryLedger, VarietyWindow};
    use crate::queue::ListKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    struct BrokenLedger;

    impl Ledger for BrokenLedger {
        fn has_recent_play(&self, _: &str, _: VarietyWindow, _: NaiveDate) -> Result<bool, LedgerError> {
            Ok(false)
        }
        fn append(&mut self, _: LedgerRecord) -> Result<(), LedgerError> {
            Err(LedgerError::Io(std::io::Error::other("read-only")))
        }
        fn prune_older_than(&mut self, _: VarietyWindow, _: NaiveDate) -> Result<usize, LedgerError> {
            Ok(0)
        }
        fn backfill(&mut self, _: LedgerRecord) -> Result<(), LedgerError> {
            Ok(())
        }
        fn remove(&mut self, _: &str) -> Result<Option<LedgerRecord>, LedgerError> {
            Ok(None)
        }
        fn is_logged(&self, _: &str) -> bool {
            false
        }
        fn history(&self) -> Vec<LedgerRecord> {
            Vec::new()
        }
    }

    fn store_with(handles: &[&str]) -> QueueStore {
        let mut store = QueueStore::new();
        for h in handles {
            store.append(Entrant::new(h, format!("{h}-game")));
        }
        store
    }

    #[test]
    fn test_non_moderator_is_rejected_without_arming() {
        let mut rotation = RotationController::default();
        let mut store = store_with(&["alice"]);
        let mut played = PlayedSet::new();
        let mut ledger = MemoryLedger::new();
        let now = Instant::now();

        let err = rotation
            .next(false, &mut store, &mut played, &mut ledger, now, today())
            .unwrap_err();
        assert_eq!(err, EngineError::PermissionDenied);
        assert_eq!(rotation.state(now), RotationState::Idle);
        assert_eq!(store.participant_count(), 1);
    }

    #[test]
    fn test_back_to_back_next_pops_once() {
        let mut rotation = RotationController::new(Duration::from_secs(10));
        let mut store = store_with(&["alice", "bob"]);
        let mut played = PlayedSet::new();
        let mut ledger = MemoryLedger::new();
        let t0 = Instant::now();

        let first = rotation
            .next(true, &mut store, &mut played, &mut ledger, t0, today())
            .unwrap();
        let second = rotation.next(true, &mut store, &mut played, &mut ledger, t0, today());

        let Advance::Done(turn) = first else {
            panic!("expected a turn");
        };
        assert_eq!(turn.done.entrant.handle(), "alice");
        assert_eq!(turn.next_up.as_ref().map(Entrant::handle), Some("bob"));
        assert_eq!(second, Err(EngineError::RateLimited));
        assert_eq!(store.participant_count(), 1);
        assert!(played.contains("alice"));
        assert_eq!(ledger.stored().len(), 1);

        let later = t0 + Duration::from_secs(10);
        assert!(rotation
            .next(true, &mut store, &mut played, &mut ledger, later, today())
            .is_ok());
    }

    #[test]
    fn test_empty_line_still_arms_cooldown() {
        let mut rotation = RotationController::default();
        let mut store = QueueStore::new();
        let mut played = PlayedSet::new();
        let mut ledger = MemoryLedger::new();
        let now = Instant::now();

        let advance = rotation
            .next(true, &mut store, &mut played, &mut ledger, now, today())
            .unwrap();
        assert_eq!(advance, Advance::NoOneInLine);
        assert!(matches!(rotation.state(now), RotationState::Cooldown { .. }));
    }

    #[test]
    fn test_marker_serves_subs_then_resolves_next_up() {
        let mut rotation = RotationController::new(Duration::ZERO);
        let mut store = store_with(&["alice", "bob"]);
        store.append_sub(Entrant::new("dave", "D"));
        let mut played = PlayedSet::new();
        let mut ledger = MemoryLedger::new();
        let now = Instant::now();

        let Advance::Done(turn) = rotation
            .next(true, &mut store, &mut played, &mut ledger, now, today())
            .unwrap()
        else {
            panic!("expected a turn");
        };
        assert_eq!(turn.done.entrant.handle(), "alice");
        assert_eq!(turn.next_up.as_ref().map(Entrant::handle), Some("dave"));

        let Advance::Done(turn) = rotation
            .next(true, &mut store, &mut played, &mut ledger, now, today())
            .unwrap()
        else {
            panic!("expected a turn");
        };
        assert_eq!(turn.done.from, ListKind::Subs);
        assert_eq!(turn.next_up.as_ref().map(Entrant::handle), Some("bob"));
        assert_eq!(store.marker_index(), None);
    }

    #[test]
    fn test_ledger_failure_is_a_warning() {
        let mut rotation = RotationController::default();
        let mut store = store_with(&["alice"]);
        let mut played = PlayedSet::new();
        let now = Instant::now();

        let Advance::Done(turn) = rotation
            .next(true, &mut store, &mut played, &mut BrokenLedger, now, today())
            .unwrap()
        else {
            panic!("expected a turn");
        };
        assert!(turn.warning.as_ref().is_some_and(EngineError::is_warning));
        assert!(store.is_empty());
        assert!(played.contains("alice"));
        assert_eq!(turn.next_up, None);
    }
}
