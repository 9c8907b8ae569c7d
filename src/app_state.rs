//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::domain::{ConnectionRegistry, EventBroadcaster};
use crate::persistence::RoomStore;
use crate::ws::subscription::SubscriptionSettings;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Room and message storage.
    pub store: Arc<dyn RoomStore>,
    /// Live listeners per room.
    pub registry: Arc<ConnectionRegistry>,
    /// Fan-out of room events to the registry.
    pub broadcaster: EventBroadcaster,
    /// Root cancellation token; every subscription runs on a child of it.
    pub shutdown: CancellationToken,
    /// Per-subscription limits.
    pub subscription: SubscriptionSettings,
}

impl AppState {
    /// Wires a fresh registry and broadcaster around `store`.
    ///
    /// Must be called inside a tokio runtime: the broadcaster spawns its
    /// dispatcher task.
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>, config: &RelayConfig, shutdown: CancellationToken) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = EventBroadcaster::spawn(Arc::clone(&registry));
        Self {
            store,
            registry,
            broadcaster,
            shutdown,
            subscription: SubscriptionSettings::from(config),
        }
    }
}
