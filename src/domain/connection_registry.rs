//! Room → live listener bookkeeping.
//!
//! [`ConnectionRegistry`] maps each [`RoomId`] to the set of listener
//! handles currently subscribed to it. The whole map sits behind one
//! [`tokio::sync::Mutex`]: register, deregister and every broadcast pass
//! are serialized against each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::listener::{ListenerHandle, ListenerId};
use super::{RoomEvent, RoomId};

type RoomListeners = HashMap<ListenerId, ListenerHandle>;

/// Registry of live listeners, keyed by room.
///
/// Constructed once at startup and shared through [`crate::app_state::AppState`].
///
/// # Concurrency
///
/// - A single coarse lock guards all rooms.
/// - A broadcast holds the lock for its whole enumerate/push/remove pass,
///   so events for one room reach a listener in broadcast order.
/// - Pushes never wait: a listener that cannot take an event immediately
///   is cancelled and removed.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    rooms: Mutex<HashMap<RoomId, RoomListeners>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handle` to the listener set of `room_id`.
    pub async fn register(&self, room_id: RoomId, handle: ListenerHandle) {
        let listener_id = handle.id();
        let mut rooms = self.rooms.lock().await;
        rooms.entry(room_id).or_default().insert(listener_id, handle);
        tracing::debug!(%room_id, %listener_id, "listener registered");
    }

    /// Removes a listener from `room_id`.
    ///
    /// Returns `true` if the listener was present. Removing an absent
    /// listener is a no-op. Empty rooms are dropped from the map.
    pub async fn deregister(&self, room_id: RoomId, listener_id: ListenerId) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(listeners) = rooms.get_mut(&room_id) else {
            return false;
        };
        let removed = listeners.remove(&listener_id).is_some();
        if listeners.is_empty() {
            rooms.remove(&room_id);
        }
        if removed {
            tracing::debug!(%room_id, %listener_id, "listener deregistered");
        }
        removed
    }

    /// Pushes `event` to every listener of its room.
    ///
    /// Listeners that fail to accept the event are cancelled and removed;
    /// delivery to the rest continues. Returns the number of listeners that
    /// accepted the event. A room without listeners is a silent no-op.
    pub async fn broadcast(&self, event: &Arc<RoomEvent>) -> usize {
        let room_id = event.room_id;
        let mut rooms = self.rooms.lock().await;
        let Some(listeners) = rooms.get_mut(&room_id) else {
            return 0;
        };

        let mut delivered = 0;
        listeners.retain(|listener_id, handle| match handle.try_deliver(event) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(err) => {
                tracing::warn!(
                    %room_id,
                    %listener_id,
                    kind = event.kind(),
                    error = %err,
                    "failed to deliver event, dropping listener"
                );
                handle.cancel();
                false
            }
        });

        if listeners.is_empty() {
            rooms.remove(&room_id);
        }
        delivered
    }

    /// Cancels every registered listener and clears the registry.
    ///
    /// Returns how many listeners were cancelled.
    pub async fn close_all(&self) -> usize {
        let mut rooms = self.rooms.lock().await;
        let mut closed = 0;
        for (_, listeners) in rooms.drain() {
            for handle in listeners.values() {
                handle.cancel();
                closed += 1;
            }
        }
        closed
    }

    /// Returns the number of listeners currently subscribed to `room_id`.
    pub async fn listener_count(&self, room_id: RoomId) -> usize {
        self.rooms
            .lock()
            .await
            .get(&room_id)
            .map_or(0, HashMap::len)
    }

    /// Returns `true` if `listener_id` is registered under `room_id`.
    pub async fn contains(&self, room_id: RoomId, listener_id: ListenerId) -> bool {
        self.rooms
            .lock()
            .await
            .get(&room_id)
            .is_some_and(|listeners| listeners.contains_key(&listener_id))
    }

    /// Returns the number of rooms with at least one listener.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}
