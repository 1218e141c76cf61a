//! Waitlist data model.
//!
//! ## Contents
//! - [`Entrant`], [`Entry`] participants and the sub-list marker
//! - [`QueueStore`] main sequence + priority sub-list with the marker invariant
//! - [`PlayedSet`] handles that already had their turn this session

mod entry;
mod played;
mod store;

pub use entry::{Entrant, Entry, UNSET_DISPLAY_NAME, normalize_handle};
pub use played::PlayedSet;
pub use store::{ListKind, Popped, QueueStore};
