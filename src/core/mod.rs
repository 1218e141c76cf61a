//! Engine core: state ownership, operations and the async front end.
//!
//! ## Contents
//! - [`Engine`] owns every list, the ledger and the backups; all mutations go through it
//! - [`EngineBuilder`] assembles an engine from a [`Config`](crate::Config)
//! - [`Outcome`], [`Notice`], [`Requester`] are the operation vocabulary
//! - [`spawn`] / [`EngineHandle`] serialize concurrent callers onto one task
//!
//! ```text
//!  chat line ──► commands::dispatch ──► Engine::op(requester, args)
//!                                           │
//!                                           ├──► Outcome / EngineError ──► Reply
//!                                           └──► Bus ──► SubscriberSet
//! ```

mod builder;
mod engine;
mod outcome;
mod runner;

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use outcome::{Availability, Notice, Outcome, Requester};
pub use runner::{EngineHandle, spawn};
