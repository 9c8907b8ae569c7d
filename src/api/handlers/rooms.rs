//! Room handlers: create, list, get.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateRoomRequest, CreateRoomResponse};
use crate::app_state::AppState;
use crate::domain::RoomId;
use crate::error::{ErrorResponse, RelayError};
use crate::persistence::Room;

/// `POST /api/rooms` — Create a room.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] for an undecodable body or a blank
/// or overlong theme, and
/// [`RelayError::Unavailable`] if the store fails.
#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "Rooms",
    summary = "Create a room",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = CreateRoomResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_room(
    State(state): State<AppState>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let Json(req) = payload?;
    let theme = req.validated_theme()?;
    let id = state.store.insert_room(theme).await?;
    tracing::info!(room_id = %id, theme, "room created");
    Ok((StatusCode::CREATED, Json(CreateRoomResponse { id })))
}

/// `GET /api/rooms` — List rooms.
///
/// # Errors
///
/// Returns [`RelayError::Unavailable`] if the store fails.
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "Rooms",
    summary = "List rooms",
    responses(
        (status = 200, description = "All rooms", body = Vec<Room>),
    )
)]
pub async fn list_rooms(State(state): State<AppState>) -> Result<impl IntoResponse, RelayError> {
    Ok(Json(state.store.list_rooms().await?))
}

/// `GET /api/rooms/{room_id}` — Get one room.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] for a malformed id and
/// [`RelayError::RoomNotFound`] if the room does not exist.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}",
    tag = "Rooms",
    summary = "Get a room",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    responses(
        (status = 200, description = "Room", body = Room),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(raw_room_id): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let room_id: RoomId = raw_room_id.parse()?;
    Ok(Json(state.store.get_room(room_id).await?))
}

/// Room routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{room_id}", get(get_room))
}
