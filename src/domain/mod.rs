//! Domain layer: room identity, events, and the live subscription core.
//!
//! The [`ConnectionRegistry`] tracks which listeners are attached to which
//! room; the [`EventBroadcaster`] fans [`RoomEvent`]s out to them.

pub mod broadcaster;
pub mod connection_registry;
pub mod listener;
pub mod room_event;
pub mod room_id;

pub use broadcaster::EventBroadcaster;
pub use connection_registry::ConnectionRegistry;
pub use listener::{DeliveryError, ListenerHandle, ListenerId};
pub use room_event::{RoomEvent, RoomEventPayload};
pub use room_id::RoomId;
