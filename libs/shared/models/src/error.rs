use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error carrying a prepared JSON body (code, message, validation maps).
    #[error("{status}: {body}")]
    Structured { status: StatusCode, body: Value },
}

impl AppError {
    pub fn structured(status: StatusCode, body: Value) -> Self {
        AppError::Structured { status, body }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Structured { status, .. } => *status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Structured { body, .. } => body,
            AppError::BadRequest(msg)
            | AppError::Internal(msg)
            | AppError::Database(msg)
            | AppError::ValidationError(msg) => json!({ "error": msg }),
        };

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, body);
        } else {
            tracing::debug!("Rejected request: {}: {}", status, body);
        }

        (status, Json(body)).into_response()
    }
}
