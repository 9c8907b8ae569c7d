//! REST endpoint handlers organized by resource.

pub mod messages;
pub mod rooms;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(rooms::routes())
        .merge(messages::routes())
}
