//! Participant routes: join, list, heartbeat.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Deserialize;

use super::{store_error_to_api, user_header};
use crate::error::ApiError;
use crate::services::presence::{HeartbeatError, JoinError};
use crate::state::AppState;
use crate::store::Participant;

#[derive(Debug, Deserialize)]
pub struct JoinBody {
    #[serde(default)]
    pub name: String,
}

/// `POST /participants` — register a participant.
pub async fn create_participant(
    State(state): State<AppState>,
    Json(body): Json<JoinBody>,
) -> Result<StatusCode, ApiError> {
    state
        .presence
        .join(&body.name)
        .await
        .map_err(join_error_to_api)?;
    Ok(StatusCode::CREATED)
}

/// `GET /participants` — snapshot of active participants.
pub async fn list_participants(State(state): State<AppState>) -> Result<Json<Vec<Participant>>, ApiError> {
    let participants = state
        .presence
        .list_participants()
        .await
        .map_err(|e| store_error_to_api(&e))?;
    Ok(Json(participants))
}

/// `POST /status` — heartbeat for the participant in the `User` header.
pub async fn heartbeat(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    state
        .presence
        .heartbeat(user_header(&headers))
        .await
        .map_err(heartbeat_error_to_api)?;
    Ok(StatusCode::OK)
}

pub(crate) fn join_error_to_api(err: JoinError) -> ApiError {
    match &err {
        JoinError::InvalidName => ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, &err),
        JoinError::NameTaken(_) => ApiError::new(StatusCode::CONFLICT, &err),
        JoinError::Store(e) => store_error_to_api(e),
    }
}

pub(crate) fn heartbeat_error_to_api(err: HeartbeatError) -> ApiError {
    match &err {
        HeartbeatError::UnknownParticipant(_) => ApiError::new(StatusCode::NOT_FOUND, &err),
        HeartbeatError::Store(e) => store_error_to_api(e),
    }
}

#[cfg(test)]
#[path = "participants_test.rs"]
mod tests;
