//! # Event subscriber trait.
//!
//! [`Subscribe`] is how outside code reacts to the waitlist: chat announcers,
//! audit trails, stream overlays. Handlers never run on the engine's thread.
//!
//! ```text
//! SubscriberSet ──► [bounded queue] ──► worker task ──► subscriber.on_event()
//!                                    └─► panic caught → EventKind::SubscriberPanicked
//! ```
//!
//! A full queue drops the incoming event for that subscriber alone and reports
//! `EventKind::SubscriberOverflow` on the bus.

use async_trait::async_trait;

use crate::events::Event;

/// Receives engine events on its own worker task.
///
/// Implementations should not block the executor. A slow handler only backs up
/// its own queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events arrive in publish order.
    async fn on_event(&self, event: &Event);

    /// Name reported in logs and in overflow or panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length for this subscriber (at least 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
