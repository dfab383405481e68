//! Message routes: send and read.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Deserialize;

use super::{store_error_to_api, user_header};
use crate::error::ApiError;
use crate::services::messages::{ReadError, SendError, parse_limit};
use crate::state::AppState;
use crate::store::Message;

#[derive(Debug, Deserialize)]
pub struct SendBody {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<String>,
}

/// `POST /messages` — send as the participant in the `User` header.
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SendBody>,
) -> Result<StatusCode, ApiError> {
    state
        .messages
        .send(user_header(&headers), &body.to, &body.text, &body.kind)
        .await
        .map_err(send_error_to_api)?;
    Ok(StatusCode::CREATED)
}

/// `GET /messages?limit=N` — messages visible to the `User` header, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let limit = parse_limit(query.limit.as_deref()).map_err(read_error_to_api)?;
    let messages = state
        .messages
        .list_visible(user_header(&headers), limit)
        .await
        .map_err(read_error_to_api)?;
    Ok(Json(messages))
}

pub(crate) fn send_error_to_api(err: SendError) -> ApiError {
    match &err {
        SendError::UnknownSender(_) | SendError::InvalidMessage(_) => {
            ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, &err)
        }
        SendError::Store(e) => store_error_to_api(e),
    }
}

pub(crate) fn read_error_to_api(err: ReadError) -> ApiError {
    match &err {
        ReadError::InvalidViewer | ReadError::InvalidLimit => ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, &err),
        ReadError::Store(e) => store_error_to_api(e),
    }
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;
