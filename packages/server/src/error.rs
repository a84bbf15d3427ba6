//! Application-level error type returned by handlers.
//!
//! The client reads plain text on failure, so every variant becomes a
//! `text/plain` body with the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maltego::DecodeError;

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, message).into_response()
    }
}

impl From<DecodeError> for AppError {
    fn from(e: DecodeError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}
