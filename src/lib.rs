//! # lineup
//!
//! **Lineup** is a rotating participant waitlist for live sessions: viewers join
//! a line, a moderator advances it one turn at a time, and a priority sub-list
//! lets new subscribers skip ahead.
//!
//! It provides admission gates, a marker-based priority sub-list, a rate limited
//! rotation, a play-history ledger with a variety window, and CSV backups the
//! lists can be restored from after a restart.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   chat line ("!join Al")          subscription notice
//!        │                                 │
//!        ▼                                 ▼
//!   commands::dispatch ──────────► Engine::op(requester, args)
//!        ▲                                 │
//!        │ Reply                           ├─► AdmissionPolicy (join)
//!        │                                 ├─► RotationController + CooldownGuard (next)
//!        │                                 ├─► QueueStore / PlayedSet
//!        │                                 ├─► Ledger (history, variety window)
//!        │                                 ├─► BackupStore::snapshot(list)
//!        └──── Outcome / EngineError ◄─────┘
//!                                          │
//!                                          ▼ publish(Event)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                     (capacity: Config::bus_capacity)              │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │ SubscriberSet::listen  │
//!                       └───┬────────────────┬───┘
//!                           ▼                ▼
//!                       LogWriter      custom Subscribe
//! ```
//!
//! ### The line
//! ```text
//! main:  [ alice ] [ <subs> ] [ bob ] [ carol ]      subs: [ dave ] [ erin ]
//!                      │
//!                      └─ marker: while present, `next` serves the sub-list head
//!
//! next ─► cooldown armed? ──yes──► RateLimited (silent)
//!           │ no
//!           ├─► pop head (marker resolves to sub-list head)
//!           ├─► played += handle, ledger.append(today)
//!           └─► "alice is done. dave is up next!"
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Engine**        | Single owner of all state; every mutation goes through it.   | [`Engine`], [`EngineBuilder`], [`Outcome`]  |
//! | **Admission**     | Ordered join gates driven by runtime toggles.                | [`AdmissionPolicy`], [`Toggles`]            |
//! | **Rotation**      | Marker-aware `next` behind a cooldown deadline.              | [`RotationController`], [`CooldownGuard`]   |
//! | **History**       | Play ledger with a variety window and pruning.               | [`Ledger`], [`MemoryLedger`], [`VarietyWindow`] |
//! | **Recovery**      | Per-list CSV snapshots and restore.                          | [`BackupStore`], [`FileBackup`]             |
//! | **Commands**      | Chat-line parsing and reply rendering.                       | [`dispatch`], [`Reply`]                     |
//! | **Async**         | Serialize concurrent callers onto one engine task.           | [`spawn`], [`EngineHandle`]                 |
//! | **Subscriber API**| Hook into engine events.                                     | [`Subscribe`], [`SubscriberSet`]            |
//! | **Configuration** | Defaults, TOML file and `LINEUP_*` environment layers.       | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): exports a built-in [`LogWriter`] subscriber.
//! - `sqlite` (default): exports `SqliteLedger`.
//!
//! ## Example
//! ```rust
//! use lineup::{Config, EngineBuilder, Notice, Requester};
//!
//! let mut cfg = Config::default();
//! cfg.toggles.open = true;
//! let mut engine = EngineBuilder::new(cfg).build().unwrap();
//!
//! engine.join(&Requester::viewer("alice"), "Al").unwrap();
//! engine.join(&Requester::subscriber("bob"), "Bo").unwrap();
//!
//! let out = engine.next(&Requester::moderator("streamer")).unwrap();
//! match out.notice {
//!     Notice::Advanced { done, next_up } => {
//!         assert_eq!(done.handle(), "alice");
//!         assert_eq!(next_up.unwrap().handle(), "bob");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod backup;
mod clock;
pub mod commands;
mod config;
mod controller;
mod core;
mod error;
mod events;
pub mod ledger;
mod policies;
mod queue;
mod subscribers;

// ---- Public re-exports ----

pub use backup::{BackupStore, FileBackup, MemoryBackup};
pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{Reply, dispatch};
pub use config::Config;
pub use controller::{Advance, RotationController, Turn};
pub use core::{
    Availability, Engine, EngineBuilder, EngineHandle, Notice, Outcome, Requester, spawn,
};
pub use error::{BackupError, ConfigError, Denial, EngineError, LedgerError, SubmitError};
pub use events::{Bus, Event, EventKind};
pub use ledger::{Ledger, LedgerRecord, MemoryLedger, VarietyWindow};
pub use policies::{
    AdmissionContext, AdmissionPolicy, CooldownGuard, JoinRequest, RotationState, Toggle,
    Toggles, Verdict,
};
pub use queue::{Entrant, Entry, ListKind, PlayedSet, Popped, QueueStore};
pub use subscribers::{Subscribe, SubscriberSet};

#[cfg(feature = "sqlite")]
pub use ledger::SqliteLedger;

// Built-in tracing subscriber.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
