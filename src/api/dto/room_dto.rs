//! Room DTOs for create and list operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::RoomId;
use crate::error::RelayError;

/// Longest accepted theme, in characters (`rooms.theme` column width).
pub const MAX_THEME_CHARS: usize = 255;

/// Request body for `POST /api/rooms`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    /// Discussion theme of the room.
    pub theme: String,
}

impl CreateRoomRequest {
    /// Returns the trimmed theme.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidInput`] if the theme is blank or longer
    /// than [`MAX_THEME_CHARS`].
    pub fn validated_theme(&self) -> Result<&str, RelayError> {
        let theme = self.theme.trim();
        if theme.is_empty() {
            return Err(RelayError::InvalidInput("theme must not be empty".to_string()));
        }
        if theme.chars().count() > MAX_THEME_CHARS {
            return Err(RelayError::InvalidInput(format!(
                "theme must be at most {MAX_THEME_CHARS} characters"
            )));
        }
        Ok(theme)
    }
}

/// Response body for `POST /api/rooms` (201 Created).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRoomResponse {
    /// Identifier of the new room.
    pub id: RoomId,
}
