//! Message handlers: post, read, react, answer.
//!
//! Every mutating handler stores first and publishes afterwards, so a
//! listener is never told about a change the store rejected.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::dto::{
    CreateMessageRequest, CreateMessageResponse, ReactionResponse, parse_message_id,
};
use crate::app_state::AppState;
use crate::domain::{RoomEvent, RoomId};
use crate::error::{ErrorResponse, RelayError};
use crate::persistence::Message;
use crate::ws::subscription::validate_room;

/// `GET /api/rooms/{room_id}/messages` — List messages of a room.
///
/// # Errors
///
/// Returns [`RelayError::RoomNotFound`] if the room does not exist.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/messages",
    tag = "Messages",
    summary = "List room messages",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = Vec<Message>),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(raw_room_id): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let room_id = validate_room(state.store.as_ref(), &raw_room_id).await?;
    Ok(Json(state.store.list_messages(room_id).await?))
}

/// `POST /api/rooms/{room_id}/messages` — Post a message and notify
/// listeners with `message_created`.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] for a malformed id, an undecodable
/// body or a blank or overlong message, and [`RelayError::RoomNotFound`] if the room does not exist.
#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/messages",
    tag = "Messages",
    summary = "Post a message",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = CreateMessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    Path(raw_room_id): Path<String>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let Json(req) = payload?;
    let room_id = validate_room(state.store.as_ref(), &raw_room_id).await?;
    let text = req.validated_message()?;
    let id = state.store.insert_message(room_id, text).await?;

    state
        .broadcaster
        .publish(RoomEvent::message_created(room_id, id, text));

    tracing::info!(%room_id, message_id = %id, "message created");
    Ok((StatusCode::CREATED, Json(CreateMessageResponse { id })))
}

/// `GET /api/rooms/{room_id}/messages/{message_id}` — Get one message.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] for malformed ids and
/// [`RelayError::MessageNotFound`] if the message is not in the room.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}/messages/{message_id}",
    tag = "Messages",
    summary = "Get a message",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
        ("message_id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn get_message(
    State(state): State<AppState>,
    Path((raw_room_id, raw_message_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, RelayError> {
    let room_id: RoomId = raw_room_id.parse()?;
    let message_id = parse_message_id(&raw_message_id)?;
    Ok(Json(state.store.get_message(room_id, message_id).await?))
}

/// `PATCH /api/rooms/{room_id}/messages/{message_id}/react` — Add a
/// reaction and notify listeners with `message_reaction_increased`.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] for malformed ids and
/// [`RelayError::MessageNotFound`] if the message is not in the room.
#[utoipa::path(
    patch,
    path = "/api/rooms/{room_id}/messages/{message_id}/react",
    tag = "Messages",
    summary = "React to a message",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
        ("message_id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    responses(
        (status = 200, description = "New reaction count", body = ReactionResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn react_to_message(
    State(state): State<AppState>,
    Path((raw_room_id, raw_message_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, RelayError> {
    let room_id: RoomId = raw_room_id.parse()?;
    let message_id = parse_message_id(&raw_message_id)?;
    let count = state.store.react_to_message(room_id, message_id).await?;

    state
        .broadcaster
        .publish(RoomEvent::reaction_increased(room_id, message_id, count));
    Ok(Json(ReactionResponse { count }))
}

/// `DELETE /api/rooms/{room_id}/messages/{message_id}/react` — Remove a
/// reaction and notify listeners with `message_reaction_decreased`.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] for malformed ids and
/// [`RelayError::MessageNotFound`] if the message is not in the room.
#[utoipa::path(
    delete,
    path = "/api/rooms/{room_id}/messages/{message_id}/react",
    tag = "Messages",
    summary = "Remove a reaction",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
        ("message_id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    responses(
        (status = 200, description = "New reaction count", body = ReactionResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path((raw_room_id, raw_message_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, RelayError> {
    let room_id: RoomId = raw_room_id.parse()?;
    let message_id = parse_message_id(&raw_message_id)?;
    let count = state.store.remove_reaction(room_id, message_id).await?;

    state
        .broadcaster
        .publish(RoomEvent::reaction_decreased(room_id, message_id, count));
    Ok(Json(ReactionResponse { count }))
}

/// `PATCH /api/rooms/{room_id}/messages/{message_id}/answer` — Mark a
/// message answered and notify listeners with `message_answered`.
///
/// # Errors
///
/// Returns [`RelayError::InvalidInput`] for malformed ids and
/// [`RelayError::MessageNotFound`] if the message is not in the room.
#[utoipa::path(
    patch,
    path = "/api/rooms/{room_id}/messages/{message_id}/answer",
    tag = "Messages",
    summary = "Mark a message as answered",
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
        ("message_id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    responses(
        (status = 200, description = "Message marked as answered"),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn mark_answered(
    State(state): State<AppState>,
    Path((raw_room_id, raw_message_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, RelayError> {
    let room_id: RoomId = raw_room_id.parse()?;
    let message_id = parse_message_id(&raw_message_id)?;
    state.store.mark_answered(room_id, message_id).await?;

    state
        .broadcaster
        .publish(RoomEvent::message_answered(room_id, message_id));
    Ok(StatusCode::OK)
}

/// Message routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rooms/{room_id}/messages",
            get(list_messages).post(create_message),
        )
        .route("/rooms/{room_id}/messages/{message_id}", get(get_message))
        .route(
            "/rooms/{room_id}/messages/{message_id}/react",
            patch(react_to_message).delete(remove_reaction),
        )
        .route(
            "/rooms/{room_id}/messages/{message_id}/answer",
            patch(mark_answered),
        )
}
