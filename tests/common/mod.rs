//! Shared harness: an in-process server over an in-memory room store.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use room_relay::api;
use room_relay::app_state::AppState;
use room_relay::config::RelayConfig;
use room_relay::domain::{ConnectionRegistry, EventBroadcaster, RoomId};
use room_relay::persistence::{InMemoryRoomStore, RoomStore};

/// A running server bound to an ephemeral local port.
pub struct TestServer {
    /// Bound address.
    pub addr: SocketAddr,
    /// Registry shared with the server.
    pub registry: Arc<ConnectionRegistry>,
    /// Broadcaster shared with the server.
    pub broadcaster: EventBroadcaster,
    /// Root token; cancelling it tears down every subscription.
    pub shutdown: CancellationToken,
    /// Store shared with the server.
    pub store: Arc<InMemoryRoomStore>,
}

impl TestServer {
    /// Base HTTP URL.
    pub fn http(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// WebSocket URL of the subscription endpoint for `room`.
    pub fn subscribe_url(&self, room: &str) -> String {
        format!("ws://{}/subscribe/{room}", self.addr)
    }

    /// Polls the registry until `room` has `expected` listeners.
    pub async fn wait_for_listeners(&self, room: RoomId, expected: usize) -> bool {
        for _ in 0..200 {
            if self.registry.listener_count(room).await == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

/// Starts a server on `127.0.0.1:0` with default settings.
pub async fn spawn_server() -> TestServer {
    spawn_server_with(RelayConfig::default()).await
}

/// Starts a server on `127.0.0.1:0` with the subscription settings of
/// `config`.
pub async fn spawn_server_with(config: RelayConfig) -> TestServer {
    let store = Arc::new(InMemoryRoomStore::new());
    let shared: Arc<dyn RoomStore> = Arc::clone(&store) as Arc<dyn RoomStore>;
    let shutdown = CancellationToken::new();
    let state = AppState::new(shared, &config, shutdown.clone());
    let registry = Arc::clone(&state.registry);
    let broadcaster = state.broadcaster.clone();

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };

    let app = api::build_app(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        addr,
        registry,
        broadcaster,
        shutdown,
        store,
    }
}
