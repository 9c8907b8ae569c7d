//! Persistence layer: rooms and their messages.
//!
//! [`RoomStore`] is the seam between the HTTP layer and storage. The
//! PostgreSQL implementation backs production; the in-memory one backs
//! tests and `PERSISTENCE_ENABLED=false` runs.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryRoomStore;
pub use models::{Message, Room};
pub use postgres::PostgresRoomStore;

use crate::domain::RoomId;
use crate::error::RelayError;

/// Durable storage for rooms and messages.
///
/// Every method returns [`RelayError::Unavailable`] on backend failure,
/// keeping "storage is down" distinct from "row does not exist".
#[async_trait]
pub trait RoomStore: Send + Sync + Debug {
    /// Returns whether `room_id` names an existing room.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Unavailable`] on backend failure.
    async fn room_exists(&self, room_id: RoomId) -> Result<bool, RelayError>;

    /// Creates a room and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Unavailable`] on backend failure.
    async fn insert_room(&self, theme: &str) -> Result<RoomId, RelayError>;

    /// Fetches one room.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RoomNotFound`] if the room does not exist.
    async fn get_room(&self, room_id: RoomId) -> Result<Room, RelayError>;

    /// Lists every room.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Unavailable`] on backend failure.
    async fn list_rooms(&self) -> Result<Vec<Room>, RelayError>;

    /// Stores a message in a room and returns the message identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RoomNotFound`] if the room does not exist.
    async fn insert_message(&self, room_id: RoomId, message: &str) -> Result<Uuid, RelayError>;

    /// Fetches one message of a room.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MessageNotFound`] if the message does not
    /// belong to the room.
    async fn get_message(&self, room_id: RoomId, message_id: Uuid) -> Result<Message, RelayError>;

    /// Lists the messages of a room, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Unavailable`] on backend failure.
    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<Message>, RelayError>;

    /// Adds one reaction and returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MessageNotFound`] if the message does not
    /// belong to the room.
    async fn react_to_message(&self, room_id: RoomId, message_id: Uuid)
    -> Result<i64, RelayError>;

    /// Removes one reaction, never going below zero, and returns the new
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MessageNotFound`] if the message does not
    /// belong to the room.
    async fn remove_reaction(&self, room_id: RoomId, message_id: Uuid) -> Result<i64, RelayError>;

    /// Flags a message as answered.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MessageNotFound`] if the message does not
    /// belong to the room.
    async fn mark_answered(&self, room_id: RoomId, message_id: Uuid) -> Result<(), RelayError>;
}
