//! Subscription state machine: `Validating → Upgrading → Active → Closed`.
//!
//! Validation happens before any protocol upgrade, so a refused subscription
//! never touches the registry.

use std::fmt;
use std::time::Duration;

use crate::config::RelayConfig;
use crate::domain::RoomId;
use crate::error::RelayError;
use crate::persistence::RoomStore;

/// Lifecycle stage of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Checking the room identifier against the store.
    Validating,
    /// Performing the WebSocket handshake.
    Upgrading,
    /// Registered and receiving events.
    Active,
    /// Deregistered and released.
    Closed,
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Upgrading => "upgrading",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Why an active subscription ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The cancellation trigger fired (shutdown or delivery failure).
    Cancelled,
    /// The peer closed the socket.
    PeerClosed,
    /// Reading from the socket failed.
    ReadFailed(String),
    /// Writing an event to the socket failed.
    SendFailed(String),
    /// Writing an event to the socket took longer than allowed.
    SendTimedOut,
    /// The event could not be encoded.
    EncodeFailed(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::PeerClosed => f.write_str("peer closed"),
            Self::ReadFailed(e) => write!(f, "read failed: {e}"),
            Self::SendFailed(e) => write!(f, "send failed: {e}"),
            Self::SendTimedOut => f.write_str("send timed out"),
            Self::EncodeFailed(e) => write!(f, "encode failed: {e}"),
        }
    }
}

/// Limits applied to every subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionSettings {
    /// Events buffered per listener before it counts as too slow.
    pub buffer: usize,
    /// Upper bound for writing one event to the socket.
    pub send_timeout: Duration,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for SubscriptionSettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            buffer: config.subscriber_buffer,
            send_timeout: config.ws_send_timeout(),
        }
    }
}

/// Runs the `Validating` stage for a raw room identifier.
///
/// # Errors
///
/// - [`RelayError::InvalidInput`] if `raw_room_id` is not a UUID.
/// - [`RelayError::RoomNotFound`] if no such room exists.
/// - [`RelayError::Unavailable`] if the store cannot be reached.
pub async fn validate_room(store: &dyn RoomStore, raw_room_id: &str) -> Result<RoomId, RelayError> {
    let room_id: RoomId = raw_room_id.parse()?;
    if store.room_exists(room_id).await? {
        Ok(room_id)
    } else {
        Err(RelayError::RoomNotFound(*room_id.as_uuid()))
    }
}
