//! # Engine events emitted after every state change.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Queue events**: joins, drops, removals, renames, plugs, clears
//! - **Rotation events**: advancing the line, empty line, cooldown hits
//! - **Maintenance events**: toggles, played-set and ledger edits, restores
//! - **Infrastructure events**: persistence failures, subscriber overflow/panic
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! handle involved, the list touched and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use lineup::{Event, EventKind, ListKind};
//!
//! let ev = Event::new(EventKind::Plugged)
//!     .with_handle("alice")
//!     .with_list(ListKind::Subs)
//!     .with_position(2);
//!
//! assert_eq!(ev.kind, EventKind::Plugged);
//! assert_eq!(ev.handle.as_deref(), Some("alice"));
//! assert_eq!(ev.position, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::queue::ListKind;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `handle`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `handle`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Queue events ===
    /// A join request was admitted.
    ///
    /// Sets:
    /// - `handle`, `list`, `position`
    Joined,

    /// A join request was refused by an admission gate.
    ///
    /// Sets:
    /// - `handle`
    /// - `reason`: denial label
    JoinDenied,

    /// An entrant left the line on their own.
    ///
    /// Sets:
    /// - `handle`, `list`
    Dropped,

    /// A moderator removed an entrant.
    ///
    /// Sets:
    /// - `handle`, `list`
    Removed,

    /// A display name changed.
    ///
    /// Sets:
    /// - `handle`, `list`
    /// - `reason`: the new display name
    Renamed,

    /// A moderator inserted an entrant at a position.
    ///
    /// Sets:
    /// - `handle`, `list`, `position` (effective index)
    Plugged,

    /// A list was emptied.
    ///
    /// Sets:
    /// - `list`
    Cleared,

    // === Rotation events ===
    /// The line advanced.
    ///
    /// Sets:
    /// - `handle`: who finished
    /// - `list`: which list they came from
    /// - `reason`: who is up next, if anyone
    Advanced,

    /// `next` was called on an empty line.
    NoOneInLine,

    /// `next` was called during its cooldown.
    RateLimited,

    /// A new subscriber got a placeholder slot on the sub-list.
    ///
    /// Sets:
    /// - `handle`, `list`
    SubOffered,

    // === Maintenance events ===
    /// A toggle flipped.
    ///
    /// Sets:
    /// - `reason`: `name=value`
    Toggled,

    /// A list was reloaded from its backup.
    ///
    /// Sets:
    /// - `list`, `position`: number of entrants appended
    Restored,

    /// The played set changed outside of rotation.
    ///
    /// Sets:
    /// - `handle` (absent when cleared)
    PlayedChanged,

    /// The ledger history changed through moderator maintenance.
    ///
    /// Sets:
    /// - `handle`
    /// - `reason`: `"logged"` or `"unlogged"`
    LedgerChanged,

    /// A durable write failed after the in-memory mutation was applied.
    ///
    /// Sets:
    /// - `list` (for backups)
    /// - `reason`: error message
    PersistenceFailed,
}

/// Engine event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Handle of the entrant involved (or subscriber name).
    pub handle: Option<Arc<str>>,
    /// List touched by the operation.
    pub list: Option<ListKind>,
    /// Index or count, depending on the kind.
    pub position: Option<usize>,
    /// Human-readable reason or detail.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            handle: None,
            list: None,
            position: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the handle involved.
    #[inline]
    pub fn with_handle(mut self, handle: impl Into<Arc<str>>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    #[inline]
    pub fn with_list(mut self, list: ListKind) -> Self {
        self.list = Some(list);
        self
    }

    #[inline]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_handle(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_handle(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
