//! # room-relay
//!
//! Real-time backend for discussion rooms: clients create rooms, post
//! messages, and receive live push updates for a room over a WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Subscription Handler (ws/)
//!     │
//!     ├── EventBroadcaster (domain/)
//!     ├── ConnectionRegistry (domain/)
//!     │
//!     └── RoomStore (persistence/): PostgreSQL or in-memory
//! ```
//!
//! A posted message is stored first, then published. The broadcaster pushes
//! it to every listener registered for the room; a listener that cannot
//! keep up is cancelled and dropped without affecting the others.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod ws;
