use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid continuous value: {0}")]
    InvalidContinuousValue(f64),

    #[error("Invalid categorical domain: {0}")]
    InvalidDomain(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownCategory(_) | AppError::InvalidContinuousValue(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = if status.is_server_error() {
            tracing::error!("Internal server error: {}", self);
            "Internal server error".to_string()
        } else {
            tracing::warn!("Rejected request: {}", self);
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

// Helper function for creating internal errors
pub fn internal_error(msg: &str) -> AppError {
    AppError::Internal(msg.to_string())
}
