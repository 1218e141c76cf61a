//! Flat record codec shared by the backup stores.
//!
//! One CSV record per slot, `handle,display_name`, no header row. The `csv`
//! crate quotes display names containing the delimiter, and fields are read
//! back untrimmed, so any name survives a round trip byte for byte.
//!
//! The sub-list marker is written as [`MARKER_RECORD`], at its index in the main
//! sequence. Chat handles never contain a space, so it never collides with
//! an entrant.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use crate::error::BackupError;
use crate::queue::{Entrant, Entry};

/// Record standing in for the sub-list marker.
pub const MARKER_RECORD: [&str; 2] = ["check !showsubs", "check !showsubs"];

/// Writes `entries` in order.
pub fn encode<W: Write>(writer: W, entries: &[Entry]) -> Result<(), BackupError> {
    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    for entry in entries {
        match entry {
            Entry::Participant(entrant) => {
                csv.write_record([entrant.handle(), entrant.display_name()])?
            }
            Entry::SubscriberMarker => csv.write_record(MARKER_RECORD)?,
        }
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads entries in file order.
///
/// Records with fewer than two fields are skipped; empty input is an empty list.
pub fn decode<R: Read>(reader: R) -> Result<Vec<Entry>, BackupError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut record = StringRecord::new();
    while csv.read_record(&mut record)? {
        match parse_row(&record) {
            Some(entry) => entries.push(entry),
            None => debug!(?record, "skipping short backup record"),
        }
    }
    Ok(entries)
}

fn parse_row(record: &StringRecord) -> Option<Entry> {
    let handle = record.get(0).map(str::trim).filter(|h| !h.is_empty())?;
    let display_name = record.get(1)?;
    if handle == MARKER_RECORD[0] {
        return Some(Entry::SubscriberMarker);
    }
    Some(Entry::Participant(Entrant::new(handle, display_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participants(entrants: &[Entrant]) -> Vec<Entry> {
        entrants.iter().cloned().map(Entry::from).collect()
    }

    #[test]
    fn test_round_trip_preserves_order_and_commas() {
        let entries = participants(&[
            Entrant::new("alice", "Ali, the Great"),
            Entrant::unnamed("bob"),
            Entrant::new("carol", "say \"hi\""),
        ]);
        let mut buf = Vec::new();
        encode(&mut buf, &entries).unwrap();
        assert_eq!(decode(buf.as_slice()).unwrap(), entries);
    }

    #[test]
    fn test_padded_display_name_survives() {
        let entries = participants(&[Entrant::new("alice", " Al "), Entrant::new("bob", "Bo\t")]);
        let mut buf = Vec::new();
        encode(&mut buf, &entries).unwrap();
        assert_eq!(decode(buf.as_slice()).unwrap(), entries);
    }

    #[test]
    fn test_marker_keeps_its_index() {
        let entries = vec![
            Entry::SubscriberMarker,
            Entry::from(Entrant::new("bob", "Bo")),
        ];
        let mut buf = Vec::new();
        encode(&mut buf, &entries).unwrap();
        assert!(String::from_utf8_lossy(&buf).starts_with("check !showsubs,check !showsubs\n"));
        assert_eq!(decode(buf.as_slice()).unwrap(), entries);
    }

    #[test]
    fn test_decode_skips_short_records() {
        let input = "alice,A\nbroken\n\nbob,B,extra\n";
        let decoded = decode(input.as_bytes()).unwrap();
        let handles: Vec<_> = decoded
            .iter()
            .filter_map(Entry::as_participant)
            .map(Entrant::handle)
            .collect();
        assert_eq!(handles, ["alice", "bob"]);
    }

    #[test]
    fn test_empty_input_is_empty_list() {
        assert!(decode("".as_bytes()).unwrap().is_empty());
    }
}
