//! Fire-and-forget fan-out of room events.
//!
//! [`EventBroadcaster`] queues events on an unbounded channel drained by a
//! single detached dispatcher task. Publishing never waits on listeners, and
//! because one task performs every delivery pass, events reach each listener
//! in the order they were published.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{ConnectionRegistry, RoomEvent};

/// Publishes [`RoomEvent`]s to the live listeners of their room.
///
/// Each queued event gets one delivery pass,
/// [`ConnectionRegistry::broadcast`], on the dispatcher task.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    queue: mpsc::UnboundedSender<Arc<RoomEvent>>,
}

impl EventBroadcaster {
    /// Creates a broadcaster and spawns its dispatcher on the current
    /// tokio runtime.
    ///
    /// The dispatcher stops once every clone of the broadcaster is dropped.
    #[must_use]
    pub fn spawn(registry: Arc<ConnectionRegistry>) -> Self {
        let (queue, events) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(registry, events));
        Self { queue }
    }

    /// Queues `event` for delivery and returns immediately.
    ///
    /// Delivery is best effort; failures are logged by the registry and
    /// never reported back to the publisher.
    pub fn publish(&self, event: RoomEvent) {
        if self.queue.send(Arc::new(event)).is_err() {
            tracing::warn!("event dispatcher stopped, dropping event");
        }
    }
}

async fn dispatch(
    registry: Arc<ConnectionRegistry>,
    mut events: mpsc::UnboundedReceiver<Arc<RoomEvent>>,
) {
    while let Some(event) = events.recv().await {
        let delivered = registry.broadcast(&event).await;
        tracing::debug!(
            room_id = %event.room_id,
            kind = event.kind(),
            delivered,
            "event dispatched"
        );
    }
    tracing::debug!("event dispatcher stopped");
}
