//! End-to-end subscription scenarios over a real WebSocket.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use room_relay::config::RelayConfig;
use room_relay::domain::{RoomEvent, RoomId};
use room_relay::persistence::RoomStore;

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn subscribe(server: &common::TestServer, room: RoomId) -> Client {
    let Ok((socket, _)) = connect_async(server.subscribe_url(&room.to_string())).await else {
        panic!("subscription refused");
    };
    socket
}

async fn next_event(socket: &mut Client) -> Value {
    loop {
        let Ok(Some(Ok(frame))) = tokio::time::timeout(Duration::from_secs(2), socket.next()).await
        else {
            panic!("no event received");
        };
        if let Message::Text(text) = frame {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("event is not json");
            };
            return value;
        }
    }
}

async fn create_room(server: &common::TestServer, theme: &str) -> RoomId {
    let Ok(response) = reqwest::Client::new()
        .post(server.http("/api/rooms"))
        .json(&json!({ "theme": theme }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::CREATED);
    let Ok(body) = response.json::<Value>().await else {
        panic!("invalid body");
    };
    let Some(Ok(room)) = body.get("id").and_then(Value::as_str).map(str::parse::<RoomId>) else {
        panic!("missing room id");
    };
    room
}

async fn post_message(server: &common::TestServer, room: RoomId, text: &str) -> String {
    let Ok(response) = reqwest::Client::new()
        .post(server.http(&format!("/api/rooms/{room}/messages")))
        .json(&json!({ "message": text }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::CREATED);
    let Ok(body) = response.json::<Value>().await else {
        panic!("invalid body");
    };
    body.get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn posted_message_reaches_subscriber() {
    let server = common::spawn_server().await;
    let room = create_room(&server, "rust").await;
    let mut socket = subscribe(&server, room).await;
    assert!(server.wait_for_listeners(room, 1).await);

    let message_id = post_message(&server, room, "hello").await;

    let event = next_event(&mut socket).await;
    assert_eq!(event.get("kind").and_then(Value::as_str), Some("message_created"));
    let value = event.get("value");
    assert_eq!(
        value.and_then(|v| v.get("message")).and_then(Value::as_str),
        Some("hello")
    );
    assert_eq!(
        value.and_then(|v| v.get("id")).and_then(Value::as_str),
        Some(message_id.as_str())
    );
}

#[tokio::test]
async fn unknown_room_is_rejected_before_upgrade() {
    let server = common::spawn_server().await;
    let room = RoomId::new();

    match connect_async(server.subscribe_url(&room.to_string())).await {
        Err(WsError::Http(response)) => assert_eq!(response.status().as_u16(), 404),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unknown room was upgraded"),
    }
    assert_eq!(server.registry.room_count().await, 0);
}

#[tokio::test]
async fn malformed_room_id_is_rejected() {
    let server = common::spawn_server().await;

    match connect_async(server.subscribe_url("not-a-room")).await {
        Err(WsError::Http(response)) => assert_eq!(response.status().as_u16(), 400),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed room was upgraded"),
    }
}

#[tokio::test]
async fn peer_close_deregisters_listener() {
    let server = common::spawn_server().await;
    let room = create_room(&server, "goodbye").await;
    let mut socket = subscribe(&server, room).await;
    assert!(server.wait_for_listeners(room, 1).await);

    assert!(socket.close(None).await.is_ok());

    assert!(server.wait_for_listeners(room, 0).await);
    let delivered = server
        .registry
        .broadcast(&std::sync::Arc::new(
            RoomEvent::message_created(room, uuid::Uuid::new_v4(), "late"),
        ))
        .await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn events_stay_in_their_room() {
    let server = common::spawn_server().await;
    let room_a = create_room(&server, "a").await;
    let room_b = create_room(&server, "b").await;
    let mut socket_a = subscribe(&server, room_a).await;
    let mut socket_b = subscribe(&server, room_b).await;
    assert!(server.wait_for_listeners(room_a, 1).await);
    assert!(server.wait_for_listeners(room_b, 1).await);

    post_message(&server, room_a, "for a").await;
    post_message(&server, room_b, "for b").await;

    let event_a = next_event(&mut socket_a).await;
    let event_b = next_event(&mut socket_b).await;
    let text = |event: &Value| {
        event
            .get("value")
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    assert_eq!(text(&event_a).as_deref(), Some("for a"));
    assert_eq!(text(&event_b).as_deref(), Some("for b"));
}

#[tokio::test]
async fn every_subscriber_sees_events_in_order() {
    let server = common::spawn_server().await;
    let room = create_room(&server, "fanout").await;
    let mut first = subscribe(&server, room).await;
    let mut second = subscribe(&server, room).await;
    assert!(server.wait_for_listeners(room, 2).await);

    post_message(&server, room, "e1").await;
    post_message(&server, room, "e2").await;

    for socket in [&mut first, &mut second] {
        let mut seen = Vec::new();
        for _ in 0..2 {
            let event = next_event(socket).await;
            seen.push(
                event
                    .get("value")
                    .and_then(|v| v.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            );
        }
        assert_eq!(seen, ["e1", "e2"]);
    }
}

#[tokio::test]
async fn reactions_and_answers_are_pushed() {
    let server = common::spawn_server().await;
    let room = create_room(&server, "q&a").await;
    let Ok(message_id) = server.store.insert_message(room, "question").await else {
        panic!("insert failed");
    };
    let mut socket = subscribe(&server, room).await;
    assert!(server.wait_for_listeners(room, 1).await);

    let client = reqwest::Client::new();
    let react_url = server.http(&format!("/api/rooms/{room}/messages/{message_id}/react"));
    let answer_url = server.http(&format!("/api/rooms/{room}/messages/{message_id}/answer"));

    tokio_test::assert_ok!(client.patch(&react_url).send().await);
    let event = next_event(&mut socket).await;
    assert_eq!(
        event.get("kind").and_then(Value::as_str),
        Some("message_reaction_increased")
    );
    assert_eq!(
        event.get("value").and_then(|v| v.get("count")).and_then(Value::as_i64),
        Some(1)
    );

    tokio_test::assert_ok!(client.delete(&react_url).send().await);
    let event = next_event(&mut socket).await;
    assert_eq!(
        event.get("kind").and_then(Value::as_str),
        Some("message_reaction_decreased")
    );

    tokio_test::assert_ok!(client.patch(&answer_url).send().await);
    let event = next_event(&mut socket).await;
    assert_eq!(event.get("kind").and_then(Value::as_str), Some("message_answered"));
}

#[tokio::test]
async fn shutdown_closes_subscribers() {
    let server = common::spawn_server().await;
    let room = create_room(&server, "shutdown").await;
    let mut socket = subscribe(&server, room).await;
    assert!(server.wait_for_listeners(room, 1).await);

    server.shutdown.cancel();

    assert!(server.wait_for_listeners(room, 0).await);
    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn stalled_socket_write_times_out_and_deregisters() {
    const BUFFER: usize = 8;
    let server = common::spawn_server_with(RelayConfig {
        subscriber_buffer: BUFFER,
        ws_send_timeout_ms: 200,
        ..RelayConfig::default()
    })
    .await;
    let room = create_room(&server, "slow reader").await;
    // Never read from this socket, so the server's writes back up.
    let socket = subscribe(&server, room).await;
    assert!(server.wait_for_listeners(room, 1).await);

    // No more events than the listener buffer holds, so only the socket
    // write timeout can remove the listener.
    let payload = "x".repeat(4 << 20);
    for _ in 0..BUFFER {
        server
            .broadcaster
            .publish(RoomEvent::message_created(room, uuid::Uuid::new_v4(), payload.as_str()));
    }

    assert!(server.wait_for_listeners(room, 0).await);
    assert_eq!(server.registry.room_count().await, 0);
    drop(socket);
}
