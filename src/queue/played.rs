use std::collections::BTreeSet;

use super::entry::normalize_handle;

/// Handles that completed a turn during the current session.
///
/// Never expires on its own; only moderator actions remove members.
#[derive(Clone, Debug, Default)]
pub struct PlayedSet {
    handles: BTreeSet<String>,
}

impl PlayedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed turn; returns `false` if already present.
    pub fn insert(&mut self, handle: &str) -> bool {
        self.handles.insert(normalize_handle(handle))
    }

    pub fn remove(&mut self, handle: &str) -> bool {
        self.handles.remove(&normalize_handle(handle))
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.handles.contains(&normalize_handle(handle))
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_normalized() {
        let mut played = PlayedSet::new();
        assert!(played.insert("@Alice"));
        assert!(!played.insert("alice"));
        assert!(played.contains("ALICE"));
        assert!(played.remove(" alice "));
        assert!(played.is_empty());
    }
}
