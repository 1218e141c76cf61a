use std::collections::HashMap;

use crate::error::BackupError;
use crate::queue::{Entry, ListKind};

use super::{BackupStore, codec};

/// Backup kept in process memory, encoded exactly as on disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackup {
    blobs: HashMap<ListKind, Vec<u8>>,
}

impl MemoryBackup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw encoded bytes of `list`, if it was ever snapshotted.
    pub fn raw(&self, list: ListKind) -> Option<&[u8]> {
        self.blobs.get(&list).map(Vec::as_slice)
    }
}

impl BackupStore for MemoryBackup {
    fn snapshot(&mut self, list: ListKind, entries: &[Entry]) -> Result<(), BackupError> {
        let mut buf = Vec::new();
        codec::encode(&mut buf, entries)?;
        self.blobs.insert(list, buf);
        Ok(())
    }

    fn restore(&self, list: ListKind) -> Result<Vec<Entry>, BackupError> {
        match self.blobs.get(&list) {
            Some(buf) => codec::decode(buf.as_slice()),
            None => Ok(Vec::new()),
        }
    }
}
