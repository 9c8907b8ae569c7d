//! Axum WebSocket upgrade handler.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use super::subscription::{SubscriptionState, validate_room};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};

/// `GET /subscribe/{room_id}` — Subscribe to live events of a room.
///
/// The room is validated before the handshake: an unknown or malformed
/// room is refused with a plain HTTP error and nothing is registered.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`], [`RelayError::RoomNotFound`] or
/// [`RelayError::Unavailable`] from validation, and
/// [`RelayError::UpgradeFailed`] if the request is not a valid WebSocket
/// upgrade.
#[utoipa::path(
    get,
    path = "/subscribe/{room_id}",
    tag = "Subscriptions",
    summary = "Subscribe to room events",
    description = "Upgrades to a WebSocket that receives `{kind, value}` events for the room until either side disconnects.",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 400, description = "Invalid room id or upgrade request", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn subscribe_handler(
    Path(raw_room_id): Path<String>,
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, RelayError> {
    tracing::info!(
        room_id = %raw_room_id,
        state = %SubscriptionState::Validating,
        "new client tried to connect"
    );
    let room_id = validate_room(state.store.as_ref(), &raw_room_id).await?;

    tracing::debug!(%room_id, state = %SubscriptionState::Upgrading, "upgrading connection");
    let ws = ws.map_err(|rejection| {
        tracing::warn!(%room_id, error = %rejection, "failed to upgrade connection");
        RelayError::UpgradeFailed(rejection.body_text())
    })?;

    let AppState {
        registry,
        shutdown,
        subscription,
        ..
    } = state;

    Ok(ws
        .on_failed_upgrade(move |err| {
            tracing::warn!(%room_id, error = %err, "websocket handshake failed");
        })
        .on_upgrade(move |socket| {
            run_connection(socket, room_id, registry, shutdown, subscription)
        })
        .into_response())
}
