//! In-memory implementation of [`RoomStore`].
//!
//! Used by tests and by deployments that run with `PERSISTENCE_ENABLED=false`.
//! Data lives for the lifetime of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RoomStore;
use super::models::{Message, Room};
use crate::domain::RoomId;
use crate::error::RelayError;

#[derive(Debug)]
struct RoomRecord {
    room: Room,
    messages: Vec<Message>,
}

/// Room store backed by a `RwLock<HashMap<..>>`.
#[derive(Debug, Default)]
pub struct InMemoryRoomStore {
    rooms: RwLock<HashMap<RoomId, RoomRecord>>,
}

impl InMemoryRoomStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `update` to one message and returns its result.
    async fn with_message<T>(
        &self,
        room_id: RoomId,
        message_id: Uuid,
        update: impl FnOnce(&mut Message) -> T + Send,
    ) -> Result<T, RelayError> {
        let mut rooms = self.rooms.write().await;
        rooms
            .get_mut(&room_id)
            .and_then(|record| record.messages.iter_mut().find(|m| m.id == message_id))
            .map(update)
            .ok_or(RelayError::MessageNotFound(message_id))
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn room_exists(&self, room_id: RoomId) -> Result<bool, RelayError> {
        Ok(self.rooms.read().await.contains_key(&room_id))
    }

    async fn insert_room(&self, theme: &str) -> Result<RoomId, RelayError> {
        let room_id = RoomId::new();
        let record = RoomRecord {
            room: Room {
                id: room_id,
                theme: theme.to_string(),
            },
            messages: Vec::new(),
        };
        self.rooms.write().await.insert(room_id, record);
        Ok(room_id)
    }

    async fn get_room(&self, room_id: RoomId) -> Result<Room, RelayError> {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .map(|record| record.room.clone())
            .ok_or(RelayError::RoomNotFound(*room_id.as_uuid()))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RelayError> {
        let rooms = self.rooms.read().await;
        let mut list: Vec<Room> = rooms.values().map(|record| record.room.clone()).collect();
        list.sort_by(|a, b| a.theme.cmp(&b.theme));
        Ok(list)
    }

    async fn insert_message(&self, room_id: RoomId, message: &str) -> Result<Uuid, RelayError> {
        let mut rooms = self.rooms.write().await;
        let record = rooms
            .get_mut(&room_id)
            .ok_or(RelayError::RoomNotFound(*room_id.as_uuid()))?;
        let message_id = Uuid::new_v4();
        record.messages.push(Message {
            id: message_id,
            room_id,
            message: message.to_string(),
            reaction_count: 0,
            answered: false,
            created_at: Utc::now(),
        });
        Ok(message_id)
    }

    async fn get_message(&self, room_id: RoomId, message_id: Uuid) -> Result<Message, RelayError> {
        self.with_message(room_id, message_id, |m| m.clone()).await
    }

    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<Message>, RelayError> {
        Ok(self
            .rooms
            .read()
            .await
            .get(&room_id)
            .map(|record| record.messages.clone())
            .unwrap_or_default())
    }

    async fn react_to_message(
        &self,
        room_id: RoomId,
        message_id: Uuid,
    ) -> Result<i64, RelayError> {
        self.with_message(room_id, message_id, |m| {
            m.reaction_count = m.reaction_count.saturating_add(1);
            m.reaction_count
        })
        .await
    }

    async fn remove_reaction(&self, room_id: RoomId, message_id: Uuid) -> Result<i64, RelayError> {
        self.with_message(room_id, message_id, |m| {
            m.reaction_count = (m.reaction_count - 1).max(0);
            m.reaction_count
        })
        .await
    }

    async fn mark_answered(&self, room_id: RoomId, message_id: Uuid) -> Result<(), RelayError> {
        self.with_message(room_id, message_id, |m| m.answered = true)
            .await
    }
}
