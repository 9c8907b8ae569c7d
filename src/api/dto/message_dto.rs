//! Message DTOs for posting and reacting.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RelayError;

/// Longest accepted message, in characters (`messages.message` column width).
pub const MAX_MESSAGE_CHARS: usize = 2048;

/// Request body for `POST /api/rooms/{room_id}/messages`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    /// Message text.
    pub message: String,
}

impl CreateMessageRequest {
    /// Returns the message text.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidInput`] if the message is blank or
    /// longer than [`MAX_MESSAGE_CHARS`].
    pub fn validated_message(&self) -> Result<&str, RelayError> {
        if self.message.trim().is_empty() {
            return Err(RelayError::InvalidInput("message must not be empty".to_string()));
        }
        if self.message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(RelayError::InvalidInput(format!(
                "message must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }
        Ok(&self.message)
    }
}

/// Response body for `POST /api/rooms/{room_id}/messages` (201 Created).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMessageResponse {
    /// Identifier of the new message.
    pub id: Uuid,
}

/// Response body for reaction endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReactionResponse {
    /// Reaction count after the change.
    pub count: i64,
}

/// Parses a message identifier from a path segment.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] if `raw` is not a UUID.
pub fn parse_message_id(raw: &str) -> Result<Uuid, RelayError> {
    Uuid::parse_str(raw).map_err(|_| RelayError::InvalidInput("invalid message id".to_string()))
}
