//! # Event bus for engine state changes.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] sender. The engine publishes one
//! [`Event`] per accepted operation; subscriber workers publish overflow and
//! panic reports on the same channel.
//!
//! ```text
//! Publishers:                        Listener (one):
//!   Engine        ──┐
//!                   ├────► Bus ───────► SubscriberSet::listen ────► Subscribe impls
//!   Sub. workers  ──┘  (broadcast chan)
//! ```
//!
//! The engine is synchronous, so publishing must never wait: a missing or lagging
//! listener only loses events, it never stalls a command.
//!
//! ## Delivery
//! - Events sent while nobody listens are gone.
//! - The ring buffer holds the last `capacity` events for all receivers together.
//! - A receiver that falls behind sees `RecvError::Lagged(n)` and resumes at the
//!   oldest retained event.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publishing end of the engine's event channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring buffer holds `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to every live receiver; never blocks.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens an independent receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(1024)
    }
}
