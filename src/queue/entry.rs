use std::fmt;

/// Display name used when an entrant has not told us their in-activity name yet.
pub const UNSET_DISPLAY_NAME: &str = "NULL";

/// A participant: unique lowercase `handle` plus a mutable display name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entrant {
    handle: String,
    display_name: String,
}

impl Entrant {
    /// Creates an entrant; the handle is trimmed and lowercased.
    pub fn new(handle: impl AsRef<str>, display_name: impl Into<String>) -> Self {
        Self {
            handle: normalize_handle(handle.as_ref()),
            display_name: display_name.into(),
        }
    }

    /// Creates an entrant whose display name is not known yet.
    pub fn unnamed(handle: impl AsRef<str>) -> Self {
        Self::new(handle, UNSET_DISPLAY_NAME)
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// True while the display name is the `NULL` placeholder.
    pub fn is_unnamed(&self) -> bool {
        self.display_name == UNSET_DISPLAY_NAME
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// Case-insensitive display-name match.
    pub fn matches_name(&self, needle: &str) -> bool {
        self.display_name.eq_ignore_ascii_case(needle.trim())
    }
}

impl fmt::Display for Entrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.handle, self.display_name)
    }
}

/// One slot of the main sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// A real entrant.
    Participant(Entrant),
    /// "Serve the priority sub-list here."
    SubscriberMarker,
}

impl Entry {
    pub fn is_marker(&self) -> bool {
        matches!(self, Entry::SubscriberMarker)
    }

    pub fn as_participant(&self) -> Option<&Entrant> {
        match self {
            Entry::Participant(entrant) => Some(entrant),
            Entry::SubscriberMarker => None,
        }
    }

    pub fn into_participant(self) -> Option<Entrant> {
        match self {
            Entry::Participant(entrant) => Some(entrant),
            Entry::SubscriberMarker => None,
        }
    }
}

impl From<Entrant> for Entry {
    fn from(entrant: Entrant) -> Self {
        Entry::Participant(entrant)
    }
}

/// Canonical handle form.
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_lowercase()
}
