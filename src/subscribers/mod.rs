//! # Event subscribers for the lineup engine.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that fans
//! engine events out to every registered subscriber.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Engine ── publish(Event) ──► Bus ──► SubscriberSet::listen
//!                                              │
//!                                    ┌─────────┼─────────┐
//!                                    ▼         ▼         ▼
//!                                LogWriter   Chat     Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use lineup::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Announcer;
//!
//! #[async_trait]
//! impl Subscribe for Announcer {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::Advanced {
//!             // post to chat
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "announcer"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
