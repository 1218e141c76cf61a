use crate::error::EngineError;
use crate::ledger::LedgerRecord;
use crate::policies::{Toggle, Toggles};
use crate::queue::{Entrant, Entry, ListKind};

/// Who issued a command, with pre-resolved privileges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester {
    pub handle: String,
    pub is_moderator: bool,
    pub is_subscriber: bool,
}

impl Requester {
    pub fn viewer(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            is_moderator: false,
            is_subscriber: false,
        }
    }

    pub fn subscriber(handle: impl Into<String>) -> Self {
        Self {
            is_subscriber: true,
            ..Self::viewer(handle)
        }
    }

    pub fn moderator(handle: impl Into<String>) -> Self {
        Self {
            is_moderator: true,
            ..Self::viewer(handle)
        }
    }
}

/// Whether a requester may join right now, as far as history goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Free,
    /// Played this session, or inside the variety window while `variety` is on.
    PlayedRecently,
    /// Played this session and `variety` is off.
    PlayedThisSession,
}

/// What an accepted operation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Joined {
        entrant: Entrant,
        position: usize,
    },
    Dropped {
        entrant: Entrant,
        from: ListKind,
    },
    Renamed {
        entrant: Entrant,
        list: ListKind,
    },
    Plugged {
        entrant: Entrant,
        list: ListKind,
        /// Effective index; `None` when appended at the back.
        position: Option<usize>,
    },
    Removed {
        entrant: Entrant,
        from: ListKind,
    },
    /// `list` was emptied (`Main` clears the sub-list too).
    Cleared {
        list: ListKind,
    },
    Advanced {
        done: Entrant,
        next_up: Option<Entrant>,
    },
    NoOneInLine,
    Toggled {
        toggle: Toggle,
        value: bool,
        toggles: Toggles,
    },
    Queue(Vec<Entry>),
    Subs(Vec<Entrant>),
    Played(Vec<String>),
    Availability {
        handle: String,
        availability: Availability,
    },
    PlayedAdded {
        handle: String,
    },
    PlayedRemoved {
        handle: String,
    },
    PlayedCleared,
    /// A new subscriber got a placeholder slot on the sub-list.
    SubOffered {
        handle: String,
    },
    OptedIn {
        entrant: Entrant,
    },
    OptedOut {
        handle: String,
    },
    Logged(LedgerRecord),
    Unlogged(LedgerRecord),
    Log(Vec<LedgerRecord>),
    Restored {
        list: ListKind,
        count: usize,
    },
    /// Nothing happened and nothing needs saying.
    Ignored,
}

/// Successful result of an engine operation.
///
/// `warnings` holds persistence failures that happened after the in-memory
/// state was already updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub notice: Notice,
    pub warnings: Vec<EngineError>,
}

impl Outcome {
    pub fn new(notice: Notice) -> Self {
        Self {
            notice,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<EngineError>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl From<Notice> for Outcome {
    fn from(notice: Notice) -> Self {
        Outcome::new(notice)
    }
}
