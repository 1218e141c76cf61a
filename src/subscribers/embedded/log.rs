//! # LogWriter: engine events as `tracing` records
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Install a `tracing_subscriber` to see them.
//!
//! ## Example output
//! ```text
//! INFO lineup: joined handle=alice list=queue position=0
//! INFO lineup: advanced handle=alice list=queue next=bob
//! WARN lineup: persistence failed list=sublist err="backup io error ..."
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let handle = e.handle.as_deref().unwrap_or("-");
        let list = e.list.map_or("-", |l| l.as_label());
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::Joined | EventKind::Plugged | EventKind::SubOffered => {
                info!(target: "lineup", seq = e.seq, handle, list, position = ?e.position, "{:?}", e.kind);
            }
            EventKind::JoinDenied => {
                debug!(target: "lineup", seq = e.seq, handle, reason, "join denied");
            }
            EventKind::Dropped | EventKind::Removed | EventKind::Cleared => {
                info!(target: "lineup", seq = e.seq, handle, list, "{:?}", e.kind);
            }
            EventKind::Renamed => {
                info!(target: "lineup", seq = e.seq, handle, list, name = reason, "renamed");
            }
            EventKind::Advanced => {
                info!(target: "lineup", seq = e.seq, handle, list, next = reason, "advanced");
            }
            EventKind::NoOneInLine => {
                info!(target: "lineup", seq = e.seq, "no one in line");
            }
            EventKind::RateLimited => {
                debug!(target: "lineup", seq = e.seq, "next during cooldown");
            }
            EventKind::Toggled => {
                info!(target: "lineup", seq = e.seq, toggle = reason, "toggled");
            }
            EventKind::Restored => {
                info!(target: "lineup", seq = e.seq, list, count = ?e.position, "restored");
            }
            EventKind::PlayedChanged | EventKind::LedgerChanged => {
                info!(target: "lineup", seq = e.seq, handle, detail = reason, "{:?}", e.kind);
            }
            EventKind::PersistenceFailed => {
                warn!(target: "lineup", seq = e.seq, list, err = reason, "persistence failed");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "lineup", subscriber = handle, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "lineup", subscriber = handle, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
