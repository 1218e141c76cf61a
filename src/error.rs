//! Error types used by the lineup engine and its stores.
//!
//! This module defines the engine-facing taxonomy and the storage errors it wraps:
//!
//! - [`Denial`]: reasons an admission gate refused a join request.
//! - [`EngineError`]: every non-success result of an engine operation.
//! - [`LedgerError`] / [`BackupError`]: failures of the durable collaborators.
//! - [`SubmitError`]: failures of the async [`EngineHandle`](crate::EngineHandle).
//! - [`ConfigError`]: failures while loading [`Config`](crate::Config).
//!
//! All of them provide `as_label` (stable snake_case for logs/metrics); the engine
//! level types also provide `as_message` for human-readable rendering.

use std::path::PathBuf;

use thiserror::Error;

/// # Reasons an admission gate refused a join.
///
/// Gates are evaluated in declaration order; see
/// [`AdmissionPolicy`](crate::AdmissionPolicy).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The queue is not accepting joins.
    #[error("queue is closed")]
    Closed,

    /// The ledger holds a play within the variety window.
    #[error("played recently")]
    RecentlyPlayed,

    /// The entrant already completed a turn this session and runbacks are off.
    #[error("already played this session")]
    AlreadyPlayedThisSession,

    /// Subs-only mode is on and the requester is not a subscriber.
    #[error("subscribers only")]
    SubscribersOnly,

    /// The main sequence is at its configured limit.
    #[error("queue is full")]
    QueueFull,

    /// The handle is already present in the list.
    #[error("already queued")]
    AlreadyQueued,
}

impl Denial {
    /// Whether this denial is reported back to the requester.
    ///
    /// Capacity and subscriber denials are muted unless `verbose` is on;
    /// every other denial is always announced.
    ///
    /// # Example
    /// ```
    /// use lineup::Denial;
    ///
    /// assert!(Denial::Closed.is_announced(false));
    /// assert!(!Denial::QueueFull.is_announced(false));
    /// assert!(Denial::QueueFull.is_announced(true));
    /// ```
    pub fn is_announced(&self, verbose: bool) -> bool {
        match self {
            Denial::SubscribersOnly | Denial::QueueFull => verbose,
            Denial::Closed
            | Denial::RecentlyPlayed
            | Denial::AlreadyPlayedThisSession
            | Denial::AlreadyQueued => true,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Denial::Closed => "denied_closed",
            Denial::RecentlyPlayed => "denied_recently_played",
            Denial::AlreadyPlayedThisSession => "denied_already_played",
            Denial::SubscribersOnly => "denied_subscribers_only",
            Denial::QueueFull => "denied_queue_full",
            Denial::AlreadyQueued => "denied_already_queued",
        }
    }
}

/// # Errors produced by engine operations.
///
/// Every variant is a value: the engine never panics on malformed input.
/// `OperationFailed` also appears as a *warning* inside a successful
/// [`Outcome`](crate::Outcome) when persistence failed after the in-memory
/// mutation was applied.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An admission gate refused the request.
    #[error("denied: {0}")]
    Denied(Denial),

    /// The referenced entrant is not present.
    #[error("{what} not found")]
    NotFound {
        /// Handle or display name that was looked up.
        what: String,
    },

    /// Missing or malformed argument (name, handle, position, toggle).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the input.
        reason: String,
    },

    /// The operation requires a moderator.
    #[error("permission denied")]
    PermissionDenied,

    /// `next` was invoked during its cooldown.
    #[error("rate limited")]
    RateLimited,

    /// The handle is already part of the ledger history.
    #[error("{handle} is already logged")]
    AlreadyLogged {
        /// Handle that was already present.
        handle: String,
    },

    /// A persistence/storage call failed.
    #[error("operation failed: {error}")]
    OperationFailed {
        /// The underlying storage error message.
        error: String,
    },
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidArgument`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`EngineError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound { what: what.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lineup::{Denial, EngineError};
    ///
    /// assert_eq!(EngineError::RateLimited.as_label(), "rate_limited");
    /// assert_eq!(EngineError::Denied(Denial::Closed).as_label(), "denied_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::Denied(denial) => denial.as_label(),
            EngineError::NotFound { .. } => "not_found",
            EngineError::InvalidArgument { .. } => "invalid_argument",
            EngineError::PermissionDenied => "permission_denied",
            EngineError::RateLimited => "rate_limited",
            EngineError::AlreadyLogged { .. } => "already_logged",
            EngineError::OperationFailed { .. } => "operation_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EngineError::Denied(denial) => format!("denied: {denial}"),
            EngineError::NotFound { what } => format!("not found: {what}"),
            EngineError::InvalidArgument { reason } => format!("invalid argument: {reason}"),
            EngineError::PermissionDenied => "moderator only".to_string(),
            EngineError::RateLimited => "cooldown active".to_string(),
            EngineError::AlreadyLogged { handle } => format!("already logged: {handle}"),
            EngineError::OperationFailed { error } => format!("storage: {error}"),
        }
    }

    /// True for failures that leave the in-memory state mutated.
    pub fn is_warning(&self) -> bool {
        matches!(self, EngineError::OperationFailed { .. })
    }
}

impl From<Denial> for EngineError {
    fn from(value: Denial) -> Self {
        EngineError::Denied(value)
    }
}

impl From<LedgerError> for EngineError {
    fn from(value: LedgerError) -> Self {
        EngineError::OperationFailed {
            error: value.to_string(),
        }
    }
}

impl From<BackupError> for EngineError {
    fn from(value: BackupError) -> Self {
        EngineError::OperationFailed {
            error: value.to_string(),
        }
    }
}

/// # Errors produced by a [`Ledger`](crate::Ledger).
#[derive(Error, Debug)]
pub enum LedgerError {
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("journal error: {0}")]
    Journal(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed date {value:?} for {handle}")]
    MalformedDate { handle: String, value: String },
}

impl LedgerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            #[cfg(feature = "sqlite")]
            LedgerError::Sqlite(_) => "ledger_sqlite",
            LedgerError::Journal(_) => "ledger_journal",
            LedgerError::Io(_) => "ledger_io",
            LedgerError::MalformedDate { .. } => "ledger_malformed_date",
        }
    }
}

/// # Errors produced by a [`BackupStore`](crate::BackupStore).
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("backup codec error: {0}")]
    Codec(#[from] csv::Error),

    #[error("backup io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackupError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BackupError::Codec(_) => "backup_codec",
            BackupError::Io { .. } => "backup_io",
        }
    }
}

/// Error returned by [`EngineHandle::submit`](crate::EngineHandle::submit).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Request queue is full (try again later or use async `submit`).
    #[error("request queue full")]
    Full,

    /// Engine task is gone (cancelled or finished).
    #[error("engine channel closed")]
    Closed,
}

/// Error returned by [`Config::load`](crate::Config::load).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),

    /// A value parsed but lies outside what the engine accepts.
    #[error("config error: {field} = {value} exceeds the maximum of {max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Figment(_) => "config_invalid",
            ConfigError::OutOfRange { .. } => "config_out_of_range",
        }
    }
}
