//! # Queue store: main sequence plus priority sub-list.
//!
//! ```text
//!   main:  [ alice ][ ◆ ][ bob ][ carol ]       ◆ = SubscriberMarker
//!                     │
//!   subs:           [ dave ][ erin ]
//! ```
//!
//! ## Invariants
//! - The marker is present ⟺ the sub-list is non-empty; there is at most one.
//! - The marker is inserted at index `min(1, len)`: it sits behind the earliest
//!   regular entrant. Rotation may later leave it at the head while the sub-list
//!   is served; it is never deeper than index 1.
//! - Adding the first sub-list member inserts the marker; removing the last one
//!   removes it, in the same call.
//!
//! ## Positions
//! Positions passed to [`QueueStore::insert_at`] are 0-based indices into the
//! *current* main sequence, the marker counting as a slot. With a marker at
//! index `m`, the effective index is `max(position, m + 1)` clamped to the length,
//! so an entrant is never placed ahead of the marker and the marker never moves.
//! Without a marker, and on the sub-list, positions only clamp to the length.
//!
//! ## Restore
//! [`QueueStore::snapshot`] of the main sequence keeps the marker in place.
//! When [`QueueStore::extend`] loads such a snapshot into a main sequence with no
//! participants, the marker's slot is remembered and reused once the sub-list is
//! back, so a line whose sub-list was up next is restored that way.

use std::fmt;

use crate::error::EngineError;

use super::entry::{Entrant, Entry, normalize_handle};

/// Which of the two lists an operation touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Main sequence.
    Main,
    /// Priority sub-list.
    Subs,
}

impl ListKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            ListKind::Main => "queue",
            ListKind::Subs => "sublist",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// An entrant taken off the front of the line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Popped {
    pub entrant: Entrant,
    pub from: ListKind,
}

/// Ordered waitlist with an interleaved priority sub-list.
#[derive(Clone, Debug, Default)]
pub struct QueueStore {
    main: Vec<Entry>,
    subs: Vec<Entrant>,
    /// Marker slot carried over from a restored main sequence.
    restored_slot: Option<usize>,
}

impl QueueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Read accessors ----

    /// Main sequence including the marker.
    pub fn entries(&self) -> &[Entry] {
        &self.main
    }

    /// Main-sequence participants in order (marker skipped).
    pub fn participants(&self) -> impl Iterator<Item = &Entrant> {
        self.main.iter().filter_map(Entry::as_participant)
    }

    /// Number of main-sequence participants (marker excluded).
    pub fn participant_count(&self) -> usize {
        self.participants().count()
    }

    /// Priority sub-list in order.
    pub fn subs(&self) -> &[Entrant] {
        &self.subs
    }

    /// True when neither list holds anyone.
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.subs.is_empty()
    }

    /// Index of the marker in the main sequence.
    pub fn marker_index(&self) -> Option<usize> {
        self.main.iter().position(Entry::is_marker)
    }

    /// Head of the main sequence.
    pub fn head(&self) -> Option<&Entry> {
        self.main.first()
    }

    /// Who `next` would pop: the main head, or the sub-list head when the marker leads.
    pub fn next_up(&self) -> Option<&Entrant> {
        match self.main.first()? {
            Entry::Participant(entrant) => Some(entrant),
            Entry::SubscriberMarker => self.subs.first(),
        }
    }

    /// Whether `handle` is in the main sequence.
    pub fn contains(&self, handle: &str) -> bool {
        let handle = normalize_handle(handle);
        self.participants().any(|e| e.handle() == handle)
    }

    /// Whether `handle` is in the sub-list.
    pub fn contains_sub(&self, handle: &str) -> bool {
        let handle = normalize_handle(handle);
        self.subs.iter().any(|e| e.handle() == handle)
    }

    /// Looks `handle` up in the main sequence, then in the sub-list.
    pub fn find(&self, handle: &str) -> Option<(&Entrant, ListKind)> {
        let handle = normalize_handle(handle);
        self.participants()
            .find(|e| e.handle() == handle)
            .map(|e| (e, ListKind::Main))
            .or_else(|| {
                self.subs
                    .iter()
                    .find(|e| e.handle() == handle)
                    .map(|e| (e, ListKind::Subs))
            })
    }

    /// Snapshot of one list as plain entrants (the marker is derived state and skipped).
    pub fn list(&self, kind: ListKind) -> Vec<Entrant> {
        match kind {
            ListKind::Main => self.participants().cloned().collect(),
            ListKind::Subs => self.subs.clone(),
        }
    }

    /// Copy of one list for backups; the main sequence keeps its marker.
    ///
    /// A marker slot still waiting for the sub-list is written where it will go.
    pub fn snapshot(&self, kind: ListKind) -> Vec<Entry> {
        match kind {
            ListKind::Main => {
                let mut entries = self.main.clone();
                if let (None, Some(slot)) = (self.marker_index(), self.restored_slot) {
                    entries.insert(slot.min(entries.len()), Entry::SubscriberMarker);
                }
                entries
            }
            ListKind::Subs => self.subs.iter().cloned().map(Entry::Participant).collect(),
        }
    }

    // ---- Main sequence ----

    /// Appends to the back of the main sequence; returns the index used.
    pub fn append(&mut self, entrant: Entrant) -> usize {
        self.main.push(Entry::Participant(entrant));
        self.main.len() - 1
    }

    /// Inserts at `position` (see module docs); returns the effective index.
    pub fn insert_at(&mut self, position: usize, entrant: Entrant) -> usize {
        let floor = self.marker_index().map_or(0, |m| m + 1);
        let index = position.max(floor).min(self.main.len());
        self.main.insert(index, Entry::Participant(entrant));
        index
    }

    /// Removes the first main-sequence participant matching `needle`.
    ///
    /// Handles are tried first; display names are the fallback.
    pub fn remove_by(&mut self, needle: &str) -> Option<Entrant> {
        let handle = normalize_handle(needle);
        let index = self
            .position_in_main(|e| e.handle() == handle)
            .or_else(|| self.position_in_main(|e| e.matches_name(needle)))?;
        match self.main.remove(index) {
            Entry::Participant(entrant) => Some(entrant),
            Entry::SubscriberMarker => None,
        }
    }

    /// Removes `handle` from whichever list holds it, main sequence first.
    ///
    /// Display names are not consulted.
    pub fn remove_handle(&mut self, handle: &str) -> Option<(Entrant, ListKind)> {
        let wanted = normalize_handle(handle);
        if let Some(index) = self.position_in_main(|e| e.handle() == wanted) {
            if let Entry::Participant(entrant) = self.main.remove(index) {
                return Some((entrant, ListKind::Main));
            }
        }
        let index = self.subs.iter().position(|e| e.handle() == wanted)?;
        let entrant = self.subs.remove(index);
        self.sync_marker();
        Some((entrant, ListKind::Subs))
    }

    /// Renames `handle` in the main sequence, falling back to the sub-list.
    pub fn rename_display_name(
        &mut self,
        handle: &str,
        name: &str,
    ) -> Result<ListKind, EngineError> {
        let wanted = normalize_handle(handle);
        if let Some(entrant) = self
            .main
            .iter_mut()
            .filter_map(|e| match e {
                Entry::Participant(entrant) => Some(entrant),
                Entry::SubscriberMarker => None,
            })
            .find(|e| e.handle() == wanted)
        {
            entrant.set_display_name(name);
            return Ok(ListKind::Main);
        }
        self.rename_sub(handle, name).map(|()| ListKind::Subs)
    }

    /// Empties the main sequence and, with it, the sub-list the marker pointed at.
    pub fn clear(&mut self) {
        self.main.clear();
        self.subs.clear();
        self.restored_slot = None;
    }

    /// Appends main-sequence entries verbatim (restore path, no deduplication).
    ///
    /// A marker among `entries` only counts when nobody was in the main sequence
    /// before; see the module docs. Returns the number of participants added.
    pub fn extend<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<Entry>,
    {
        let fresh = self.participant_count() == 0;
        let mut added = 0;
        let mut slot = None;
        for entry in entries.into_iter().map(Into::into) {
            match entry {
                Entry::Participant(entrant) => {
                    self.main.push(Entry::Participant(entrant));
                    added += 1;
                }
                Entry::SubscriberMarker if slot.is_none() => slot = Some(added),
                Entry::SubscriberMarker => {}
            }
        }

        if let (true, Some(slot)) = (fresh, slot) {
            self.restored_slot = Some(slot.min(1));
            self.main.retain(|e| !e.is_marker());
            self.sync_marker();
        }
        added
    }

    // ---- Priority sub-list ----

    /// Appends to the sub-list, inserting the marker if this is the first member.
    pub fn append_sub(&mut self, entrant: Entrant) -> usize {
        self.subs.push(entrant);
        self.sync_marker();
        self.subs.len() - 1
    }

    /// Inserts into the sub-list at `position` (clamped); returns the index used.
    pub fn insert_sub_at(&mut self, position: usize, entrant: Entrant) -> usize {
        let index = position.min(self.subs.len());
        self.subs.insert(index, entrant);
        self.sync_marker();
        index
    }

    /// Removes the first sub-list member matching `needle` (handle, then display name).
    ///
    /// Removing the last member drops the marker.
    pub fn remove_sub_by(&mut self, needle: &str) -> Option<Entrant> {
        let handle = normalize_handle(needle);
        let index = self
            .subs
            .iter()
            .position(|e| e.handle() == handle)
            .or_else(|| self.subs.iter().position(|e| e.matches_name(needle)))?;
        let entrant = self.subs.remove(index);
        self.sync_marker();
        Some(entrant)
    }

    /// Renames a sub-list member only.
    pub fn rename_sub(&mut self, handle: &str, name: &str) -> Result<(), EngineError> {
        let wanted = normalize_handle(handle);
        let entrant = self
            .subs
            .iter_mut()
            .find(|e| e.handle() == wanted)
            .ok_or_else(|| EngineError::not_found(wanted.clone()))?;
        entrant.set_display_name(name);
        Ok(())
    }

    /// Empties the sub-list and drops the marker.
    pub fn clear_subs(&mut self) {
        self.subs.clear();
        self.sync_marker();
    }

    /// Appends sub-list entrants verbatim (restore path, no deduplication).
    pub fn extend_subs(&mut self, entrants: impl IntoIterator<Item = Entrant>) -> usize {
        let before = self.subs.len();
        self.subs.extend(entrants);
        self.sync_marker();
        self.subs.len() - before
    }

    // ---- Rotation ----

    /// Pops whoever is next, honoring the marker.
    pub fn pop_next(&mut self) -> Option<Popped> {
        self.restored_slot = None;
        if self.main.first()?.is_marker() {
            if self.subs.is_empty() {
                self.sync_marker();
                return self.pop_next();
            }
            let entrant = self.subs.remove(0);
            self.sync_marker();
            return Some(Popped {
                entrant,
                from: ListKind::Subs,
            });
        }
        match self.main.remove(0) {
            Entry::Participant(entrant) => Some(Popped {
                entrant,
                from: ListKind::Main,
            }),
            Entry::SubscriberMarker => None,
        }
    }

    /// Checks the marker invariant.
    pub fn marker_invariant_holds(&self) -> bool {
        let markers = self.main.iter().filter(|e| e.is_marker()).count();
        match (self.subs.is_empty(), self.marker_index()) {
            (true, None) => true,
            (false, Some(index)) => markers == 1 && index <= 1,
            _ => false,
        }
    }

    fn position_in_main(&self, pred: impl Fn(&Entrant) -> bool) -> Option<usize> {
        self.main
            .iter()
            .position(|e| e.as_participant().is_some_and(&pred))
    }

    /// Re-establishes "marker present ⟺ sub-list non-empty".
    fn sync_marker(&mut self) {
        match (self.subs.is_empty(), self.marker_index()) {
            (true, Some(_)) => self.main.retain(|e| !e.is_marker()),
            (false, None) => {
                let index = self.restored_slot.take().unwrap_or(1).min(self.main.len());
                self.main.insert(index, Entry::SubscriberMarker);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(handle: &str) -> Entrant {
        Entrant::new(handle, format!("{handle}-game"))
    }

    fn handles(store: &QueueStore) -> Vec<String> {
        store
            .entries()
            .iter()
            .map(|entry| match entry {
                Entry::Participant(p) => p.handle().to_string(),
                Entry::SubscriberMarker => "◆".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_first_sub_inserts_marker_at_index_one() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append(e("bob"));
        store.append_sub(e("dave"));

        assert_eq!(handles(&store), ["alice", "◆", "bob"]);
        assert_eq!(store.marker_index(), Some(1));
        assert!(store.marker_invariant_holds());
    }

    #[test]
    fn test_marker_leads_empty_main() {
        let mut store = QueueStore::new();
        store.append_sub(e("dave"));
        assert_eq!(handles(&store), ["◆"]);
        assert_eq!(store.next_up().map(Entrant::handle), Some("dave"));
        store.append(e("alice"));
        assert_eq!(handles(&store), ["◆", "alice"]);
        assert!(store.marker_invariant_holds());
    }

    #[test]
    fn test_removing_last_sub_drops_marker() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append_sub(e("dave"));
        store.append_sub(e("erin"));

        assert!(store.remove_sub_by("dave").is_some());
        assert_eq!(store.marker_index(), Some(1));
        assert!(store.remove_sub_by("erin-game").is_some());
        assert_eq!(store.marker_index(), None);
        assert_eq!(handles(&store), ["alice"]);
        assert!(store.marker_invariant_holds());
    }

    #[test]
    fn test_clear_subs_drops_marker() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append_sub(e("dave"));
        store.clear_subs();
        assert!(store.marker_invariant_holds());
        assert_eq!(handles(&store), ["alice"]);
    }

    #[test]
    fn test_insert_never_lands_ahead_of_marker() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append(e("bob"));
        store.append_sub(e("dave"));
        // [alice, ◆, bob]

        assert_eq!(store.insert_at(0, e("x")), 2);
        assert_eq!(store.insert_at(1, e("y")), 2);
        assert_eq!(store.insert_at(2, e("z")), 2);
        assert_eq!(handles(&store), ["alice", "◆", "z", "y", "x", "bob"]);
        assert_eq!(store.marker_index(), Some(1));
    }

    #[test]
    fn test_insert_position_counts_marker_slot() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append(e("bob"));
        store.append(e("carol"));
        store.append_sub(e("dave"));
        // [alice, ◆, bob, carol]; index 3 is between bob and carol.
        assert_eq!(store.insert_at(3, e("x")), 3);
        assert_eq!(handles(&store), ["alice", "◆", "bob", "x", "carol"]);
    }

    #[test]
    fn test_insert_without_marker_clamps_to_len() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        assert_eq!(store.insert_at(0, e("x")), 0);
        assert_eq!(store.insert_at(99, e("y")), 2);
        assert_eq!(handles(&store), ["x", "alice", "y"]);
    }

    #[test]
    fn test_remove_by_prefers_handle_over_display_name() {
        let mut store = QueueStore::new();
        store.append(Entrant::new("bob", "alice"));
        store.append(Entrant::new("alice", "Ally"));

        let removed = store.remove_by("alice").unwrap();
        assert_eq!(removed.handle(), "alice");
        let removed = store.remove_by("ALICE").unwrap();
        assert_eq!(removed.handle(), "bob");
        assert!(store.remove_by("alice").is_none());
    }

    #[test]
    fn test_rename_checks_both_lists() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append_sub(e("dave"));

        assert_eq!(store.rename_display_name("alice", "A").unwrap(), ListKind::Main);
        assert_eq!(store.rename_display_name("DAVE", "D").unwrap(), ListKind::Subs);
        assert_eq!(
            store.rename_display_name("zed", "Z"),
            Err(EngineError::not_found("zed"))
        );
        assert_eq!(store.find("dave").unwrap().0.display_name(), "D");
    }

    #[test]
    fn test_pop_next_serves_subs_at_marker() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append(e("bob"));
        store.append_sub(e("dave"));
        store.append_sub(e("erin"));

        let order: Vec<_> = std::iter::from_fn(|| store.pop_next())
            .map(|p| (p.entrant.handle().to_string(), p.from))
            .collect();
        assert_eq!(
            order,
            [
                ("alice".to_string(), ListKind::Main),
                ("dave".to_string(), ListKind::Subs),
                ("erin".to_string(), ListKind::Subs),
                ("bob".to_string(), ListKind::Main),
            ]
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_handle_ignores_display_names() {
        let mut store = QueueStore::new();
        store.append(Entrant::new("bob", "alice"));
        store.append_sub(e("alice"));

        let (removed, from) = store.remove_handle("alice").unwrap();
        assert_eq!((removed.handle(), from), ("alice", ListKind::Subs));
        assert_eq!(store.marker_index(), None);
        assert!(store.remove_handle("alice").is_none());
        assert!(store.contains("bob"));
    }

    #[test]
    fn test_participant_count_excludes_marker() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append_sub(e("dave"));
        assert_eq!(store.entries().len(), 2);
        assert_eq!(store.participant_count(), 1);
        assert_eq!(store.list(ListKind::Main), vec![e("alice")]);
    }

    #[test]
    fn test_snapshot_keeps_marker_at_head() {
        let mut store = QueueStore::new();
        store.append(e("alice"));
        store.append(e("bob"));
        store.append_sub(e("dave"));
        store.pop_next();
        // [◆, bob], dave is up next.

        let main = store.snapshot(ListKind::Main);
        let subs: Vec<Entrant> = store
            .snapshot(ListKind::Subs)
            .into_iter()
            .filter_map(Entry::into_participant)
            .collect();
        assert_eq!(main, vec![Entry::SubscriberMarker, Entry::from(e("bob"))]);

        let mut main_first = QueueStore::new();
        main_first.extend(main.clone());
        assert_eq!(handles(&main_first), ["bob"]);
        assert_eq!(main_first.snapshot(ListKind::Main), main);
        main_first.extend_subs(subs.clone());
        assert_eq!(handles(&main_first), ["◆", "bob"]);
        assert_eq!(main_first.next_up().map(Entrant::handle), Some("dave"));

        let mut subs_first = QueueStore::new();
        subs_first.extend_subs(subs);
        subs_first.extend(main);
        assert_eq!(handles(&subs_first), ["◆", "bob"]);
        assert!(subs_first.marker_invariant_holds());
    }

    #[test]
    fn test_restored_marker_slot_behind_head() {
        let mut store = QueueStore::new();
        store.append_sub(e("dave"));
        // Sub-list restored first put the marker at the head of an empty line.
        store.extend(vec![
            Entry::from(e("alice")),
            Entry::SubscriberMarker,
            Entry::from(e("bob")),
        ]);
        assert_eq!(handles(&store), ["alice", "◆", "bob"]);
    }

    #[test]
    fn test_restored_marker_ignored_when_line_is_occupied() {
        let mut store = QueueStore::new();
        store.append(e("carol"));
        store.extend(vec![Entry::SubscriberMarker, Entry::from(e("bob"))]);
        store.append_sub(e("dave"));
        assert_eq!(handles(&store), ["carol", "◆", "bob"]);
    }

    #[test]
    fn test_extend_subs_restores_marker() {
        let mut store = QueueStore::new();
        store.extend(vec![e("alice"), e("bob")]);
        store.extend_subs(vec![e("dave")]);
        assert_eq!(handles(&store), ["alice", "◆", "bob"]);
    }
}
