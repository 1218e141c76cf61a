//! # Engine: sole owner and mutation point of the waitlist state.
//!
//! Every operation is a synchronous `&mut self` call that either fails without
//! touching state, or applies its mutation, snapshots the affected list(s) and
//! publishes an [`Event`].
//!
//! ```text
//!   op(requester, args)
//!      ├─► privilege check ───────────────► PermissionDenied
//!      ├─► validation / admission ────────► InvalidArgument | Denied | NotFound
//!      ├─► mutate QueueStore / PlayedSet / Ledger
//!      ├─► BackupStore::snapshot(list) ───► failure → Outcome.warnings (+ PersistenceFailed)
//!      └─► Bus::publish(Event)
//! ```
//!
//! Persistence is best-effort: a failed snapshot never rolls back the in-memory
//! mutation that preceded it.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backup::BackupStore;
use crate::clock::Clock;
use crate::config::Config;
use crate::controller::{Advance, RotationController};
use crate::error::{Denial, EngineError};
use crate::events::{Bus, Event, EventKind};
use crate::ledger::{Ledger, LedgerRecord};
use crate::policies::{AdmissionContext, AdmissionPolicy, JoinRequest, Toggle, Toggles, Verdict};
use crate::queue::{Entrant, Entry, ListKind, PlayedSet, QueueStore, normalize_handle};

use super::outcome::{Availability, Notice, Outcome, Requester};

type EngineResult = Result<Outcome, EngineError>;

/// The waitlist engine.
pub struct Engine {
    config: Config,
    policy: AdmissionPolicy,
    toggles: Toggles,
    store: QueueStore,
    played: PlayedSet,
    ledger: Box<dyn Ledger>,
    backup: Box<dyn BackupStore>,
    rotation: RotationController,
    clock: Arc<dyn Clock>,
    bus: Bus,
}

impl Engine {
    pub(crate) fn from_parts(
        config: Config,
        ledger: Box<dyn Ledger>,
        backup: Box<dyn BackupStore>,
        clock: Arc<dyn Clock>,
        bus: Bus,
    ) -> Self {
        Self {
            policy: config.admission(),
            toggles: config.toggles,
            rotation: RotationController::new(config.cooldown()),
            config,
            store: QueueStore::new(),
            played: PlayedSet::new(),
            ledger,
            backup,
            clock,
            bus,
        }
    }

    // ---- Accessors ----

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn toggles(&self) -> &Toggles {
        &self.toggles
    }

    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    pub fn played(&self) -> &PlayedSet {
        &self.played
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    pub fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    /// Bus the engine publishes on; subscribe before issuing commands.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    // ---- Queue ----

    /// Joins the main sequence after the admission gates.
    pub fn join(&mut self, requester: &Requester, name: &str) -> EngineResult {
        let handle = required_handle(&requester.handle)?;
        let request = JoinRequest::new(&handle, requester.is_subscriber);
        let verdict = {
            let ctx = AdmissionContext {
                toggles: &self.toggles,
                store: &self.store,
                played: &self.played,
                ledger: self.ledger.as_ref(),
                today: self.clock.today(),
            };
            self.policy.evaluate(&request, &ctx)?
        };
        if let Verdict::Deny(denial) = verdict {
            debug!(%handle, denial = denial.as_label(), "join denied");
            self.publish(
                Event::new(EventKind::JoinDenied)
                    .with_handle(handle.as_str())
                    .with_reason(denial.as_label()),
            );
            return Err(denial.into());
        }

        let name = required_text(name, "in-game name")?;
        let entrant = Entrant::new(&handle, name);
        let position = self.store.append(entrant.clone());
        info!(%handle, position, "joined");
        self.publish(
            Event::new(EventKind::Joined)
                .with_handle(handle.as_str())
                .with_list(ListKind::Main)
                .with_position(position),
        );
        let warnings = self.persist(&[ListKind::Main]);
        Ok(Outcome::new(Notice::Joined { entrant, position }).with_warnings(warnings))
    }

    /// Leaves whichever list holds the requester.
    pub fn drop(&mut self, requester: &Requester) -> EngineResult {
        let handle = required_handle(&requester.handle)?;
        let (entrant, from) = self
            .store
            .remove_handle(&handle)
            .ok_or_else(|| EngineError::not_found(handle.as_str()))?;
        info!(%handle, list = %from, "dropped");
        self.publish(
            Event::new(EventKind::Dropped)
                .with_handle(handle.as_str())
                .with_list(from),
        );
        let warnings = self.persist(&[from]);
        Ok(Outcome::new(Notice::Dropped { entrant, from }).with_warnings(warnings))
    }

    /// Changes the requester's own display name.
    pub fn rename(&mut self, requester: &Requester, name: &str) -> EngineResult {
        let handle = required_handle(&requester.handle)?;
        self.rename_entrant(&handle, name)
    }

    /// Changes someone else's display name.
    pub fn change_name(&mut self, requester: &Requester, handle: &str, name: &str) -> EngineResult {
        require_moderator(requester)?;
        let handle = required_handle(handle)?;
        self.rename_entrant(&handle, name)
    }

    /// Inserts into the main sequence, at the back or at `position`.
    pub fn plug(
        &mut self,
        requester: &Requester,
        handle: &str,
        name: &str,
        position: Option<usize>,
    ) -> EngineResult {
        self.plug_into(ListKind::Main, requester, handle, name, position)
    }

    /// Inserts into the priority sub-list, at the back or at `position`.
    pub fn plug_sub(
        &mut self,
        requester: &Requester,
        handle: &str,
        name: &str,
        position: Option<usize>,
    ) -> EngineResult {
        self.plug_into(ListKind::Subs, requester, handle, name, position)
    }

    /// Removes from the main sequence by handle, then by display name.
    pub fn remove(&mut self, requester: &Requester, needle: &str) -> EngineResult {
        self.remove_from(ListKind::Main, requester, needle)
    }

    /// Removes from the sub-list by handle, then by display name.
    pub fn remove_sub(&mut self, requester: &Requester, needle: &str) -> EngineResult {
        self.remove_from(ListKind::Subs, requester, needle)
    }

    /// Empties the main sequence and the sub-list.
    pub fn clear_queue(&mut self, requester: &Requester) -> EngineResult {
        require_moderator(requester)?;
        self.store.clear();
        info!("queue cleared");
        self.publish(Event::new(EventKind::Cleared).with_list(ListKind::Main));
        let warnings = self.persist(&[ListKind::Main, ListKind::Subs]);
        Ok(Outcome::new(Notice::Cleared {
            list: ListKind::Main,
        })
        .with_warnings(warnings))
    }

    /// Empties the sub-list.
    pub fn clear_subs(&mut self, requester: &Requester) -> EngineResult {
        require_moderator(requester)?;
        self.store.clear_subs();
        info!("sub-list cleared");
        self.publish(Event::new(EventKind::Cleared).with_list(ListKind::Subs));
        let warnings = self.persist(&[ListKind::Subs]);
        Ok(Outcome::new(Notice::Cleared {
            list: ListKind::Subs,
        })
        .with_warnings(warnings))
    }

    /// Finishes the current turn and announces who is next.
    pub fn next(&mut self, requester: &Requester) -> EngineResult {
        let now = self.clock.now();
        let today = self.clock.today();
        let advance = self.rotation.next(
            requester.is_moderator,
            &mut self.store,
            &mut self.played,
            self.ledger.as_mut(),
            now,
            today,
        );

        match advance {
            Err(EngineError::RateLimited) => {
                self.publish(Event::new(EventKind::RateLimited));
                Err(EngineError::RateLimited)
            }
            Err(err) => Err(err),
            Ok(Advance::NoOneInLine) => {
                info!("next on an empty line");
                self.publish(Event::new(EventKind::NoOneInLine));
                Ok(Outcome::new(Notice::NoOneInLine))
            }
            Ok(Advance::Done(turn)) => {
                let mut warnings = Vec::new();
                if let Some(warning) = turn.warning {
                    self.publish(
                        Event::new(EventKind::PersistenceFailed).with_reason(warning.as_message()),
                    );
                    warnings.push(warning);
                }
                warnings.extend(self.persist(&[turn.done.from]));

                let done = turn.done.entrant;
                let mut event = Event::new(EventKind::Advanced)
                    .with_handle(done.handle())
                    .with_list(turn.done.from);
                if let Some(next_up) = &turn.next_up {
                    event = event.with_reason(next_up.handle());
                }
                info!(
                    done = %done.handle(),
                    next = turn.next_up.as_ref().map_or("-", Entrant::handle),
                    "advanced"
                );
                self.publish(event);
                Ok(Outcome::new(Notice::Advanced {
                    done,
                    next_up: turn.next_up,
                })
                .with_warnings(warnings))
            }
        }
    }

    /// Flips one named toggle.
    pub fn toggle(&mut self, requester: &Requester, name: &str) -> EngineResult {
        require_moderator(requester)?;
        let toggle = Toggle::from_str(name)?;
        let value = self.toggles.flip(toggle);
        info!(%toggle, value, "toggled");
        self.publish(Event::new(EventKind::Toggled).with_reason(format!("{toggle}={value}")));
        Ok(Outcome::new(Notice::Toggled {
            toggle,
            value,
            toggles: self.toggles,
        }))
    }

    // ---- Views ----

    pub fn queue(&self) -> Outcome {
        Notice::Queue(self.store.entries().to_vec()).into()
    }

    pub fn show_subs(&self) -> Outcome {
        Notice::Subs(self.store.subs().to_vec()).into()
    }

    pub fn played_list(&self) -> Outcome {
        Notice::Played(self.played.iter().map(str::to_string).collect()).into()
    }

    /// Tells the requester whether their history lets them join.
    pub fn am_i_free(&self, requester: &Requester) -> EngineResult {
        let handle = required_handle(&requester.handle)?;
        let played = self.played.contains(&handle);
        let availability = if self.toggles.variety {
            let recent =
                played || self.ledger.has_recent_play(&handle, self.policy.window(), self.clock.today())?;
            if recent {
                Availability::PlayedRecently
            } else {
                Availability::Free
            }
        } else if played {
            Availability::PlayedThisSession
        } else {
            Availability::Free
        };
        Ok(Outcome::new(Notice::Availability {
            handle,
            availability,
        }))
    }

    // ---- Played set ----

    pub fn remove_played(&mut self, requester: &Requester, handle: &str) -> EngineResult {
        require_moderator(requester)?;
        let handle = required_handle(handle)?;
        if !self.played.remove(&handle) {
            return Err(EngineError::not_found(handle));
        }
        self.publish(
            Event::new(EventKind::PlayedChanged)
                .with_handle(handle.as_str())
                .with_reason("removed"),
        );
        Ok(Outcome::new(Notice::PlayedRemoved { handle }))
    }

    pub fn clear_played(&mut self, requester: &Requester) -> EngineResult {
        require_moderator(requester)?;
        self.played.clear();
        self.publish(Event::new(EventKind::PlayedChanged).with_reason("cleared"));
        Ok(Outcome::new(Notice::PlayedCleared))
    }

    pub fn plug_played(&mut self, requester: &Requester, handle: &str) -> EngineResult {
        require_moderator(requester)?;
        let handle = required_handle(handle)?;
        if !self.played.insert(&handle) {
            return Err(EngineError::invalid(format!(
                "{handle} is already in the played list"
            )));
        }
        self.publish(
            Event::new(EventKind::PlayedChanged)
                .with_handle(handle.as_str())
                .with_reason("added"),
        );
        Ok(Outcome::new(Notice::PlayedAdded { handle }))
    }

    // ---- New-subscriber priority ----

    /// Subscription-notice hook: offers a placeholder sub-list slot.
    ///
    /// Does nothing unless both `open` and `newsubperk` are on, or when the
    /// handle already holds a slot.
    pub fn new_subscriber(&mut self, handle: &str) -> EngineResult {
        let handle = required_handle(handle)?;
        if !(self.toggles.open && self.toggles.newsubperk) || self.store.contains_sub(&handle) {
            return Ok(Outcome::new(Notice::Ignored));
        }
        let position = self.store.append_sub(Entrant::unnamed(&handle));
        info!(%handle, "offered sub-list slot");
        self.publish(
            Event::new(EventKind::SubOffered)
                .with_handle(handle.as_str())
                .with_list(ListKind::Subs)
                .with_position(position),
        );
        let warnings = self.persist(&[ListKind::Subs]);
        Ok(Outcome::new(Notice::SubOffered { handle }).with_warnings(warnings))
    }

    /// Claims an offered sub-list slot by providing a display name.
    pub fn opt_in(&mut self, requester: &Requester, name: &str) -> EngineResult {
        let handle = required_handle(&requester.handle)?;
        if !self.store.contains_sub(&handle) {
            return Err(EngineError::not_found(handle));
        }
        let name = required_text(name, "in-game name")?;
        self.store.rename_sub(&handle, name)?;
        let entrant = Entrant::new(&handle, name);
        self.publish(
            Event::new(EventKind::Renamed)
                .with_handle(handle.as_str())
                .with_list(ListKind::Subs)
                .with_reason(name),
        );
        let warnings = self.persist(&[ListKind::Subs]);
        Ok(Outcome::new(Notice::OptedIn { entrant }).with_warnings(warnings))
    }

    /// Gives up a sub-list slot.
    pub fn opt_out(&mut self, requester: &Requester) -> EngineResult {
        let handle = required_handle(&requester.handle)?;
        if !self.store.contains_sub(&handle) {
            return Err(EngineError::not_found(handle));
        }
        // Handle matches win over display names, so this removes the requester.
        self.store.remove_sub_by(&handle);
        self.publish(
            Event::new(EventKind::Dropped)
                .with_handle(handle.as_str())
                .with_list(ListKind::Subs),
        );
        let warnings = self.persist(&[ListKind::Subs]);
        Ok(Outcome::new(Notice::OptedOut { handle }).with_warnings(warnings))
    }

    // ---- Ledger maintenance ----

    /// Back-fills a play dated today into the ledger's history view.
    pub fn plug_log(&mut self, requester: &Requester, handle: &str, name: &str) -> EngineResult {
        require_moderator(requester)?;
        let handle = required_handle(handle)?;
        let name = required_text(name, "in-game name")?;
        if self.ledger.is_logged(&handle) {
            return Err(EngineError::AlreadyLogged { handle });
        }
        let record = LedgerRecord::new(&handle, name, self.clock.today());
        self.ledger.backfill(record.clone())?;
        info!(%handle, "back-filled ledger");
        self.publish(
            Event::new(EventKind::LedgerChanged)
                .with_handle(handle.as_str())
                .with_reason("logged"),
        );
        Ok(Outcome::new(Notice::Logged(record)))
    }

    /// Deletes ledger records by handle, then by display name.
    pub fn remove_log(&mut self, requester: &Requester, needle: &str) -> EngineResult {
        require_moderator(requester)?;
        let needle = required_text(needle, "handle or name")?;
        let record = self
            .ledger
            .remove(needle)?
            .ok_or_else(|| EngineError::not_found(needle))?;
        info!(handle = %record.handle, "removed from ledger");
        self.publish(
            Event::new(EventKind::LedgerChanged)
                .with_handle(record.handle.as_str())
                .with_reason("unlogged"),
        );
        Ok(Outcome::new(Notice::Unlogged(record)))
    }

    pub fn show_log(&self, requester: &Requester) -> EngineResult {
        require_moderator(requester)?;
        Ok(Outcome::new(Notice::Log(self.ledger.history())))
    }

    // ---- Recovery ----

    /// Appends the backed-up copy of `list` in file order, without deduplication.
    ///
    /// Only `list` is written back: the other file may still hold a list that is
    /// waiting to be restored.
    pub fn restore(&mut self, requester: &Requester, list: ListKind) -> EngineResult {
        require_moderator(requester)?;
        let entries = self.backup.restore(list)?;
        let count = match list {
            ListKind::Main => self.store.extend(entries),
            ListKind::Subs => self
                .store
                .extend_subs(entries.into_iter().filter_map(Entry::into_participant)),
        };
        info!(%list, count, "restored from backup");
        self.publish(
            Event::new(EventKind::Restored)
                .with_list(list)
                .with_position(count),
        );
        let warnings = self.write_backups(&[list]);
        Ok(Outcome::new(Notice::Restored { list, count }).with_warnings(warnings))
    }

    // ---- Internals ----

    fn rename_entrant(&mut self, handle: &str, name: &str) -> EngineResult {
        let name = required_text(name, "in-game name")?;
        let list = self.store.rename_display_name(handle, name)?;
        let entrant = Entrant::new(handle, name);
        info!(%handle, %list, "renamed");
        self.publish(
            Event::new(EventKind::Renamed)
                .with_handle(handle)
                .with_list(list)
                .with_reason(name),
        );
        let warnings = self.persist(&[list]);
        Ok(Outcome::new(Notice::Renamed { entrant, list }).with_warnings(warnings))
    }

    fn plug_into(
        &mut self,
        list: ListKind,
        requester: &Requester,
        handle: &str,
        name: &str,
        position: Option<usize>,
    ) -> EngineResult {
        require_moderator(requester)?;
        let handle = required_handle(handle)?;
        let name = required_text(name, "in-game name")?;
        let present = match list {
            ListKind::Main => self.store.contains(&handle),
            ListKind::Subs => self.store.contains_sub(&handle),
        };
        if present {
            return Err(Denial::AlreadyQueued.into());
        }

        let entrant = Entrant::new(&handle, name);
        let index = match (list, position) {
            (ListKind::Main, None) => self.store.append(entrant.clone()),
            (ListKind::Main, Some(p)) => self.store.insert_at(p, entrant.clone()),
            (ListKind::Subs, None) => self.store.append_sub(entrant.clone()),
            (ListKind::Subs, Some(p)) => self.store.insert_sub_at(p, entrant.clone()),
        };
        self.played.remove(&handle);
        info!(%handle, %list, index, "plugged");
        self.publish(
            Event::new(EventKind::Plugged)
                .with_handle(handle.as_str())
                .with_list(list)
                .with_position(index),
        );
        let warnings = self.persist(&[list]);
        Ok(Outcome::new(Notice::Plugged {
            entrant,
            list,
            position: position.map(|_| index),
        })
        .with_warnings(warnings))
    }

    fn remove_from(&mut self, list: ListKind, requester: &Requester, needle: &str) -> EngineResult {
        require_moderator(requester)?;
        let needle = required_text(needle, "handle or name")?;
        let removed = match list {
            ListKind::Main => self.store.remove_by(needle),
            ListKind::Subs => self.store.remove_sub_by(needle),
        };
        let entrant = removed.ok_or_else(|| EngineError::not_found(needle))?;
        info!(handle = %entrant.handle(), %list, "removed");
        self.publish(
            Event::new(EventKind::Removed)
                .with_handle(entrant.handle())
                .with_list(list),
        );
        let warnings = self.persist(&[list]);
        Ok(Outcome::new(Notice::Removed {
            entrant,
            from: list,
        })
        .with_warnings(warnings))
    }

    /// Snapshots `lists`; failures come back as warnings.
    ///
    /// The main file records the marker, so a sub-list change rewrites it too.
    fn persist(&mut self, lists: &[ListKind]) -> Vec<EngineError> {
        let mut targets = lists.to_vec();
        if targets.contains(&ListKind::Subs) && !targets.contains(&ListKind::Main) {
            targets.push(ListKind::Main);
        }
        self.write_backups(&targets)
    }

    fn write_backups(&mut self, lists: &[ListKind]) -> Vec<EngineError> {
        let mut warnings = Vec::new();
        for &list in lists {
            let entries = self.store.snapshot(list);
            if let Err(err) = self.backup.snapshot(list, &entries) {
                warn!(%list, error = %err, label = err.as_label(), "backup snapshot failed");
                let err = EngineError::from(err);
                self.publish(
                    Event::new(EventKind::PersistenceFailed)
                        .with_list(list)
                        .with_reason(err.as_message()),
                );
                warnings.push(err);
            }
        }
        warnings
    }

    fn publish(&self, event: Event) {
        self.bus.publish(event);
    }
}

fn require_moderator(requester: &Requester) -> Result<(), EngineError> {
    if requester.is_moderator {
        Ok(())
    } else {
        Err(EngineError::PermissionDenied)
    }
}

fn required_handle(raw: &str) -> Result<String, EngineError> {
    let handle = normalize_handle(raw);
    if handle.is_empty() {
        return Err(EngineError::invalid("missing handle"));
    }
    Ok(handle)
}

fn required_text<'a>(raw: &'a str, what: &str) -> Result<&'a str, EngineError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(EngineError::invalid(format!("missing {what}")));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::MemoryBackup;
    use crate::clock::ManualClock;
    use crate::ledger::MemoryLedger;
    use chrono::NaiveDate;

    fn engine() -> Engine {
        let mut config = Config::default();
        config.toggles.open = true;
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
        Engine::from_parts(
            config,
            Box::new(MemoryLedger::new()),
            Box::new(MemoryBackup::new()),
            Arc::new(clock),
            Bus::new(64),
        )
    }

    fn m() -> Requester {
        Requester::moderator("mod")
    }

    #[test]
    fn test_gates_answer_before_missing_name() {
        let mut engine = engine();
        engine.toggle(&m(), "open").unwrap();
        assert_eq!(
            engine.join(&Requester::viewer("alice"), "  ").unwrap_err(),
            EngineError::Denied(Denial::Closed)
        );
        engine.toggle(&m(), "open").unwrap();
        assert!(matches!(
            engine.join(&Requester::viewer("alice"), "  ").unwrap_err(),
            EngineError::InvalidArgument { .. }
        ));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_drop_ignores_display_names() {
        let mut engine = engine();
        engine.join(&Requester::viewer("alice"), "bob").unwrap();
        engine.join(&Requester::viewer("bob"), "Bo").unwrap();

        let out = engine.drop(&Requester::viewer("bob")).unwrap();
        assert_eq!(
            out.notice,
            Notice::Dropped {
                entrant: Entrant::new("bob", "Bo"),
                from: ListKind::Main
            }
        );
        assert_eq!(
            engine.drop(&Requester::viewer("bob")).unwrap_err(),
            EngineError::not_found("bob")
        );
    }

    #[test]
    fn test_rename_and_change_name() {
        let mut engine = engine();
        engine.join(&Requester::viewer("alice"), "Al").unwrap();
        engine.rename(&Requester::viewer("alice"), "Alice G").unwrap();
        assert_eq!(engine.store().list(ListKind::Main)[0].display_name(), "Alice G");

        assert_eq!(
            engine
                .change_name(&Requester::viewer("eve"), "alice", "Evil")
                .unwrap_err(),
            EngineError::PermissionDenied
        );
        engine.change_name(&m(), "@Alice", "Al").unwrap();
        assert_eq!(engine.store().list(ListKind::Main)[0].display_name(), "Al");
        assert!(matches!(
            engine.change_name(&m(), "nobody", "X").unwrap_err(),
            EngineError::NotFound { .. }
        ));
    }

    #[test]
    fn test_plug_respects_marker_and_forgives_played() {
        let mut engine = engine();
        engine.join(&Requester::viewer("alice"), "Al").unwrap();
        engine.plug_sub(&m(), "dave", "Da", None).unwrap();
        engine.plug_played(&m(), "bob").unwrap();

        let out = engine.plug(&m(), "bob", "Bo", Some(0)).unwrap();
        assert!(matches!(out.notice, Notice::Plugged { position: Some(2), .. }));
        assert!(!engine.played().contains("bob"));
        assert_eq!(
            engine.store().entries()[1],
            Entry::SubscriberMarker,
            "marker stays at index 1"
        );
        assert_eq!(
            engine.plug(&m(), "bob", "Bo", None).unwrap_err(),
            EngineError::Denied(Denial::AlreadyQueued)
        );
    }

    #[test]
    fn test_remove_matches_display_name() {
        let mut engine = engine();
        engine.join(&Requester::viewer("alice"), "Al").unwrap();
        engine.plug_sub(&m(), "dave", "Da", None).unwrap();

        engine.remove(&m(), "al").unwrap();
        engine.remove_sub(&m(), "DA").unwrap();
        assert!(engine.store().is_empty());
        assert_eq!(engine.store().marker_index(), None);
        assert!(matches!(
            engine.remove(&m(), "ghost").unwrap_err(),
            EngineError::NotFound { .. }
        ));
    }

    #[test]
    fn test_clear_queue_clears_sub_list() {
        let mut engine = engine();
        engine.join(&Requester::viewer("alice"), "Al").unwrap();
        engine.plug_sub(&m(), "dave", "Da", None).unwrap();
        engine.clear_queue(&m()).unwrap();
        assert!(engine.store().is_empty());
        assert!(engine.store().subs().is_empty());
        assert!(engine.store().marker_invariant_holds());
    }

    #[test]
    fn test_toggle_unknown_name_lists_valid_ones() {
        let mut engine = engine();
        let err = engine.toggle(&m(), "turbo").unwrap_err();
        assert!(err.as_message().contains("newsubperk"));

        let out = engine.toggle(&m(), "VARIETY").unwrap();
        assert!(matches!(
            out.notice,
            Notice::Toggled {
                toggle: Toggle::Variety,
                value: true,
                ..
            }
        ));
    }

    #[test]
    fn test_played_set_maintenance() {
        let mut engine = engine();
        engine.plug_played(&m(), "alice").unwrap();
        assert!(matches!(
            engine.plug_played(&m(), "alice").unwrap_err(),
            EngineError::InvalidArgument { .. }
        ));
        assert_eq!(
            engine.am_i_free(&Requester::viewer("alice")).unwrap().notice,
            Notice::Availability {
                handle: "alice".into(),
                availability: Availability::PlayedThisSession
            }
        );

        engine.remove_played(&m(), "alice").unwrap();
        assert_eq!(
            engine.remove_played(&m(), "alice").unwrap_err(),
            EngineError::not_found("alice")
        );
        engine.plug_played(&m(), "bob").unwrap();
        engine.clear_played(&m()).unwrap();
        assert!(engine.played().is_empty());
    }

    #[test]
    fn test_next_records_turn_in_played_set() {
        let mut engine = engine();
        engine.join(&Requester::viewer("alice"), "Al").unwrap();
        engine.join(&Requester::viewer("bob"), "Bo").unwrap();

        let out = engine.next(&m()).unwrap();
        assert_eq!(
            out.notice,
            Notice::Advanced {
                done: Entrant::new("alice", "Al"),
                next_up: Some(Entrant::new("bob", "Bo")),
            }
        );
        assert!(engine.played().contains("alice"));
        assert_eq!(engine.next(&m()).unwrap_err(), EngineError::RateLimited);
    }

    #[test]
    fn test_unbounded_cooldown_does_not_break_next() {
        let mut config = Config::default();
        config.toggles.open = true;
        config.cooldown_secs = u64::MAX;
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
        let mut engine = Engine::from_parts(
            config,
            Box::new(MemoryLedger::new()),
            Box::new(MemoryBackup::new()),
            Arc::new(clock),
            Bus::new(64),
        );
        engine.join(&Requester::viewer("alice"), "Al").unwrap();

        assert!(engine.next(&m()).is_ok());
        assert_eq!(engine.next(&m()).unwrap_err(), EngineError::RateLimited);
    }

    #[test]
    fn test_opt_in_requires_offer() {
        let mut engine = engine();
        assert_eq!(
            engine.opt_in(&Requester::viewer("carol"), "Ca").unwrap_err(),
            EngineError::not_found("carol")
        );
    }
}
