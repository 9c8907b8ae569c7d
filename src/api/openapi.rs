//! OpenAPI document for the REST and subscription endpoints.

use utoipa::OpenApi;

use super::dto::{
    CreateMessageRequest, CreateMessageResponse, CreateRoomRequest, CreateRoomResponse,
    ReactionResponse,
};
use super::handlers::{messages, rooms, system};
use crate::domain::{RoomEventPayload, RoomId};
use crate::error::{ErrorBody, ErrorResponse};
use crate::persistence::{Message, Room};
use crate::ws;

/// Generated API description, served by Swagger UI when the `swagger-ui`
/// feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "room-relay", description = "Rooms, messages and live room events"),
    paths(
        system::root_handler,
        system::health_handler,
        rooms::create_room,
        rooms::list_rooms,
        rooms::get_room,
        messages::list_messages,
        messages::create_message,
        messages::get_message,
        messages::react_to_message,
        messages::remove_reaction,
        messages::mark_answered,
        ws::handler::subscribe_handler,
    ),
    components(schemas(
        RoomId,
        Room,
        Message,
        RoomEventPayload,
        CreateRoomRequest,
        CreateRoomResponse,
        CreateMessageRequest,
        CreateMessageResponse,
        ReactionResponse,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "System", description = "Greeting and health"),
        (name = "Rooms", description = "Room management"),
        (name = "Messages", description = "Messages, reactions and answers"),
        (name = "Subscriptions", description = "Live room events over WebSocket"),
    )
)]
pub struct ApiDoc;
