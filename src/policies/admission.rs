//! # Join admission policy
//!
//! A join request passes through a fixed, ordered series of gates. The first
//! gate that fails decides the [`Denial`]; later gates are not consulted, so the
//! ledger is only queried when `variety` is on.
//!
//! ```text
//!  request ─► open? ─► variety? ─► runback? ─► subs-only? ─► limit? ─► duplicate? ─► Allow
//!               │         │           │            │            │           │
//!            Closed  RecentlyPlayed  AlreadyPlayed  SubsOnly   QueueFull  AlreadyQueued
//! ```
//!
//! ## Announcement
//! `SubscribersOnly` and `QueueFull` are muted unless `verbose` is on
//! (see [`Denial::is_announced`]); every other denial is always reported.

use chrono::NaiveDate;

use crate::error::{Denial, LedgerError};
use crate::ledger::{Ledger, VarietyWindow};
use crate::queue::{PlayedSet, QueueStore, normalize_handle};

use super::toggles::Toggles;

/// Main-sequence bound applied while `limit` is on.
pub const DEFAULT_QUEUE_LIMIT: usize = 7;

/// A participant asking to enter the main sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinRequest {
    /// Normalized handle of the requester.
    pub handle: String,
    /// Pre-resolved subscriber status.
    pub is_subscriber: bool,
}

impl JoinRequest {
    pub fn new(handle: &str, is_subscriber: bool) -> Self {
        Self {
            handle: normalize_handle(handle),
            is_subscriber,
        }
    }
}

/// Result of evaluating a join request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(Denial),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Read-only view of the state the gates look at.
pub struct AdmissionContext<'a> {
    pub toggles: &'a Toggles,
    pub store: &'a QueueStore,
    pub played: &'a PlayedSet,
    pub ledger: &'a dyn Ledger,
    pub today: NaiveDate,
}

/// Ordered gate evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionPolicy {
    queue_limit: usize,
    window: VarietyWindow,
}

impl AdmissionPolicy {
    pub fn new(queue_limit: usize, window: VarietyWindow) -> Self {
        Self {
            queue_limit,
            window,
        }
    }

    pub fn queue_limit(&self) -> usize {
        self.queue_limit
    }

    pub fn window(&self) -> VarietyWindow {
        self.window
    }

    /// Runs every gate in order; the first failure wins.
    ///
    /// Only a ledger failure is an error; every refusal is a [`Verdict::Deny`].
    pub fn evaluate(
        &self,
        request: &JoinRequest,
        ctx: &AdmissionContext<'_>,
    ) -> Result<Verdict, LedgerError> {
        let toggles = ctx.toggles;
        let handle = request.handle.as_str();

        if !toggles.open {
            return Ok(Verdict::Deny(Denial::Closed));
        }
        if toggles.variety && ctx.ledger.has_recent_play(handle, self.window, ctx.today)? {
            return Ok(Verdict::Deny(Denial::RecentlyPlayed));
        }
        if !toggles.runback && ctx.played.contains(handle) {
            return Ok(Verdict::Deny(Denial::AlreadyPlayedThisSession));
        }
        if toggles.subsonlymode && !request.is_subscriber {
            return Ok(Verdict::Deny(Denial::SubscribersOnly));
        }
        if toggles.limit && ctx.store.participant_count() >= self.queue_limit {
            return Ok(Verdict::Deny(Denial::QueueFull));
        }
        if ctx.store.contains(handle) {
            return Ok(Verdict::Deny(Denial::AlreadyQueued));
        }
        Ok(Verdict::Allow)
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_LIMIT, VarietyWindow::default())
    }
}
