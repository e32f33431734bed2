use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Pre-flight rejection, no request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Transport(String),

    /// The image host answered with a well-formed failure payload.
    #[error("{0}")]
    HostRejection(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Another upload is already in progress")]
    Busy,

    #[error("Upload cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::HostRejection(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Busy => (StatusCode::CONFLICT, AppError::Busy.to_string()),
            AppError::Cancelled => (StatusCode::CONFLICT, AppError::Cancelled.to_string()),
            AppError::Transport(e) => {
                error!("upstream request failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream service unavailable".to_string(),
                )
            }
            AppError::Config(e) => {
                error!("configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
