//! WebSocket layer: subscription handshake and per-connection lifecycle.
//!
//! `GET /subscribe/{room_id}` validates the room, upgrades the connection
//! and keeps it registered in the [`crate::domain::ConnectionRegistry`]
//! until it is cancelled.

pub mod connection;
pub mod handler;
pub mod subscription;
