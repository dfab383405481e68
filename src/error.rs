//! Error codes shared by every service error.
//!
//! DESIGN
//! ======
//! Service errors are plain `thiserror` enums. Each one also implements
//! [`ErrorCode`] so the HTTP layer can render a grepable code and tell the
//! client whether retrying makes sense without matching on every variant.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Grepable error code and retryable flag for structured error bodies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON body returned for every rejected request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    pub fn from_error<E: ErrorCode>(err: &E) -> Self {
        Self { code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

/// An error paired with the status code the route chose for it.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new<E: ErrorCode>(status: StatusCode, err: &E) -> Self {
        Self { status, body: ErrorBody::from_error(err) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
