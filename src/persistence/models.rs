//! Stored rows for rooms and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::RoomId;

/// A row from the `rooms` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Discussion theme chosen at creation.
    pub theme: String,
}

/// A row from the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    /// Message identifier.
    pub id: Uuid,
    /// Room the message was posted to.
    pub room_id: RoomId,
    /// Message text.
    pub message: String,
    /// Number of reactions; never negative.
    pub reaction_count: i64,
    /// Whether the message has been answered.
    pub answered: bool,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}
