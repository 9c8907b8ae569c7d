//! Active stage of a subscription.
//!
//! Registers a listener for the room, then parks in a `select!` on the
//! cancellation trigger, the listener's event channel and the inbound half
//! of the socket. Whatever wakes it first decides the [`CloseReason`]; the
//! listener is deregistered and the socket closed on every exit path.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;

use super::subscription::{CloseReason, SubscriptionSettings, SubscriptionState};
use crate::domain::{ConnectionRegistry, ListenerHandle, RoomEvent, RoomId};

/// Runs one subscribed connection until it is cancelled.
///
/// `shutdown` is the process-wide token; the connection's own trigger is a
/// child of it, so shutting down the process tears down every listener.
/// Inbound data frames are ignored.
pub async fn run_connection(
    socket: WebSocket,
    room_id: RoomId,
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
    settings: SubscriptionSettings,
) {
    let cancel = shutdown.child_token();
    let (handle, mut events) = ListenerHandle::channel(settings.buffer, cancel.clone());
    let listener_id = handle.id();
    registry.register(room_id, handle).await;
    tracing::info!(%room_id, %listener_id, state = %SubscriptionState::Active, "client subscribed");

    let (mut ws_tx, mut ws_rx) = socket.split();

    let reason = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break CloseReason::Cancelled,
            event = events.recv() => {
                let Some(event) = event else {
                    break CloseReason::Cancelled;
                };
                if let Err(reason) = forward(&mut ws_tx, &event, settings.send_timeout).await {
                    break reason;
                }
            }
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | None => break CloseReason::PeerClosed,
                    Some(Err(err)) => break CloseReason::ReadFailed(err.to_string()),
                    Some(Ok(_)) => {}
                }
            }
        }
    };
    cancel.cancel();

    registry.deregister(room_id, listener_id).await;
    if let Err(err) = ws_tx.close().await {
        tracing::debug!(%room_id, %listener_id, error = %err, "socket already closed");
    }

    tracing::info!(
        %room_id,
        %listener_id,
        state = %SubscriptionState::Closed,
        reason = %reason,
        "client disconnected"
    );
}

/// Writes one event to the socket within `timeout`.
async fn forward(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    event: &RoomEvent,
    timeout: Duration,
) -> Result<(), CloseReason> {
    let json = event
        .to_json()
        .map_err(|e| CloseReason::EncodeFailed(e.to_string()))?;

    match tokio::time::timeout(timeout, ws_tx.send(Message::text(json))).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(CloseReason::SendFailed(err.to_string())),
        Err(_) => Err(CloseReason::SendTimedOut),
    }
}
