//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Thin HTTP layer over the presence and message services. Handlers pull
//! fields out of the request, call exactly one service operation, and map
//! its error kind to a status code. The caller's identity travels in the
//! `User` header.

pub mod messages;
pub mod participants;

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::StoreError;

/// Header naming the acting participant.
pub const USER_HEADER: &str = "user";

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/participants",
            get(participants::list_participants).post(participants::create_participant),
        )
        .route("/status", post(participants::heartbeat))
        .route("/messages", get(messages::list_messages).post(messages::send_message))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The `User` header value, or `""` when missing or not valid UTF-8.
pub(crate) fn user_header(headers: &HeaderMap) -> &str {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub(crate) fn store_error_to_api(err: &StoreError) -> ApiError {
    match err {
        StoreError::Unavailable(_) => ApiError::new(StatusCode::SERVICE_UNAVAILABLE, err),
        StoreError::Duplicate(_) => ApiError::new(StatusCode::CONFLICT, err),
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
