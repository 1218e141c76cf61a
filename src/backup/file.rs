use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BackupError;
use crate::queue::{Entry, ListKind};

use super::{BackupStore, codec};

/// File holding the main sequence.
pub const MAIN_FILE: &str = "backuplog.csv";
/// File holding the priority sub-list.
pub const SUBS_FILE: &str = "backupsublog.csv";

/// One CSV file per list inside a directory.
///
/// Snapshots truncate and rewrite the file; a missing file restores as empty.
#[derive(Clone, Debug)]
pub struct FileBackup {
    dir: PathBuf,
}

impl FileBackup {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, list: ListKind) -> PathBuf {
        let name = match list {
            ListKind::Main => MAIN_FILE,
            ListKind::Subs => SUBS_FILE,
        };
        self.dir.join(name)
    }
}

impl BackupStore for FileBackup {
    fn snapshot(&mut self, list: ListKind, entries: &[Entry]) -> Result<(), BackupError> {
        let path = self.path_for(list);
        let file = File::create(&path).map_err(|source| BackupError::Io {
            path: path.clone(),
            source,
        })?;
        codec::encode(BufWriter::new(file), entries)?;
        debug!(path = %path.display(), count = entries.len(), "wrote backup");
        Ok(())
    }

    fn restore(&self, list: ListKind) -> Result<Vec<Entry>, BackupError> {
        let path = self.path_for(list);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(BackupError::Io { path, source }),
        };
        codec::decode(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Entrant;

    fn entries(entrants: Vec<Entrant>) -> Vec<Entry> {
        entrants.into_iter().map(Entry::from).collect()
    }

    #[test]
    fn test_snapshot_then_restore_each_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut backup = FileBackup::new(dir.path());
        let main = vec![
            Entry::from(Entrant::new("alice", "A")),
            Entry::SubscriberMarker,
            Entry::from(Entrant::new("bob", "B, Jr")),
        ];
        let subs = entries(vec![Entrant::unnamed("dave")]);

        backup.snapshot(ListKind::Main, &main).unwrap();
        backup.snapshot(ListKind::Subs, &subs).unwrap();

        assert!(dir.path().join(MAIN_FILE).exists());
        assert_eq!(backup.restore(ListKind::Main).unwrap(), main);
        assert_eq!(backup.restore(ListKind::Subs).unwrap(), subs);
    }

    #[test]
    fn test_snapshot_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut backup = FileBackup::new(dir.path());
        backup
            .snapshot(ListKind::Main, &entries(vec![Entrant::new("alice", "A")]))
            .unwrap();
        backup.snapshot(ListKind::Main, &[]).unwrap();
        assert!(backup.restore(ListKind::Main).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backup = FileBackup::new(dir.path());
        assert!(backup.restore(ListKind::Subs).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut backup = FileBackup::new(dir.path().join("nope"));
        let err = backup.snapshot(ListKind::Main, &[]).unwrap_err();
        assert_eq!(err.as_label(), "backup_io");
    }
}
