//! Events that happened inside a room.
//!
//! A [`RoomEvent`] is created after a domain action has been durably stored
//! and is handed to the [`super::EventBroadcaster`] for fan-out. Events are
//! transient: the core never persists them.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::RoomId;

/// Tagged event payload as seen by WebSocket clients.
///
/// Serializes as `{"kind": "<snake_case>", "value": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoomEventPayload {
    /// A message was posted to the room.
    MessageCreated {
        /// Message identifier.
        id: Uuid,
        /// Message text.
        message: String,
    },

    /// A message received one more reaction.
    MessageReactionIncreased {
        /// Message identifier.
        id: Uuid,
        /// Reaction count after the change.
        count: i64,
    },

    /// A message lost one reaction.
    MessageReactionDecreased {
        /// Message identifier.
        id: Uuid,
        /// Reaction count after the change.
        count: i64,
    },

    /// A message was marked as answered.
    MessageAnswered {
        /// Message identifier.
        id: Uuid,
    },
}

/// An event addressed to every live listener of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEvent {
    /// Room the event belongs to. Routing only, not sent on the wire.
    pub room_id: RoomId,
    /// Payload delivered to listeners.
    pub payload: RoomEventPayload,
}

impl RoomEvent {
    /// Builds a `message_created` event.
    #[must_use]
    pub fn message_created(room_id: RoomId, id: Uuid, message: impl Into<String>) -> Self {
        Self {
            room_id,
            payload: RoomEventPayload::MessageCreated {
                id,
                message: message.into(),
            },
        }
    }

    /// Builds a `message_reaction_increased` event.
    #[must_use]
    pub const fn reaction_increased(room_id: RoomId, id: Uuid, count: i64) -> Self {
        Self {
            room_id,
            payload: RoomEventPayload::MessageReactionIncreased { id, count },
        }
    }

    /// Builds a `message_reaction_decreased` event.
    #[must_use]
    pub const fn reaction_decreased(room_id: RoomId, id: Uuid, count: i64) -> Self {
        Self {
            room_id,
            payload: RoomEventPayload::MessageReactionDecreased { id, count },
        }
    }

    /// Builds a `message_answered` event.
    #[must_use]
    pub const fn message_answered(room_id: RoomId, id: Uuid) -> Self {
        Self {
            room_id,
            payload: RoomEventPayload::MessageAnswered { id },
        }
    }

    /// Returns the event kind as a static string slice.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self.payload {
            RoomEventPayload::MessageCreated { .. } => "message_created",
            RoomEventPayload::MessageReactionIncreased { .. } => "message_reaction_increased",
            RoomEventPayload::MessageReactionDecreased { .. } => "message_reaction_decreased",
            RoomEventPayload::MessageAnswered { .. } => "message_answered",
        }
    }

    /// Encodes the wire representation of this event.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.payload)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn message_created_wire_shape() {
        let id = Uuid::new_v4();
        let event = RoomEvent::message_created(RoomId::new(), id, "hello");
        let Ok(json) = event.to_json() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("invalid json");
        };
        assert_eq!(
            value.get("kind").and_then(|v| v.as_str()),
            Some("message_created")
        );
        let body = value.get("value");
        assert_eq!(
            body.and_then(|v| v.get("message")).and_then(|v| v.as_str()),
            Some("hello")
        );
        assert_eq!(
            body.and_then(|v| v.get("id")).and_then(|v| v.as_str()),
            Some(id.to_string().as_str())
        );
    }

    #[test]
    fn room_id_stays_off_the_wire() {
        let room_id = RoomId::new();
        let event = RoomEvent::message_answered(room_id, Uuid::new_v4());
        let json = event.to_json().unwrap_or_default();
        assert!(!json.contains(&room_id.to_string()));
        assert!(json.contains("message_answered"));
    }

    #[test]
    fn kind_matches_serialized_tag() {
        let room_id = RoomId::new();
        let id = Uuid::new_v4();
        let events = [
            RoomEvent::message_created(room_id, id, "x"),
            RoomEvent::reaction_increased(room_id, id, 2),
            RoomEvent::reaction_decreased(room_id, id, 1),
            RoomEvent::message_answered(room_id, id),
        ];
        for event in &events {
            let json = event.to_json().unwrap_or_default();
            assert!(json.contains(&format!("\"kind\":\"{}\"", event.kind())));
        }
    }
}
