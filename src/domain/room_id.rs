//! Type-safe room identifier.
//!
//! [`RoomId`] wraps a [`uuid::Uuid`] (v4) so that room identifiers cannot be
//! mixed up with message or listener identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RelayError;

/// Unique identifier for a room.
///
/// Generated once when the room is created and never reused. Used as the
/// key of the [`super::ConnectionRegistry`] and as the routing target of
/// every [`super::RoomEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RoomId(uuid::Uuid);

impl RoomId {
    /// Creates a new random `RoomId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `RoomId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| RelayError::InvalidInput("invalid room id".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(RoomId::new(), RoomId::new());
    }

    #[test]
    fn parses_hyphenated_uuid() {
        let id = RoomId::new();
        let Ok(parsed) = id.to_string().parse::<RoomId>() else {
            panic!("valid room id rejected");
        };
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_input() {
        let result = "not-a-room".parse::<RoomId>();
        assert!(matches!(result, Err(RelayError::InvalidInput(_))));
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = RoomId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
    }
}
