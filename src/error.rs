use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Configuration errors
    #[error("Server configuration error: {0}")]
    Config(String),

    // Request errors
    #[error("{0}")]
    BadRequest(String),

    // Upstream errors
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upstream service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    // Service-account signing errors
    #[error("Credential error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal errors
    #[error("An unexpected error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // 400 Bad Request
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            // 500 Internal Server Error
            AppError::Config(_) => {
                tracing::error!("configuration error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Http(e) => {
                tracing::error!("upstream request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Upstream { status, body } => {
                tracing::error!("upstream error: status {}, body {}", status, body);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Jwt(e) => {
                tracing::error!("credential error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("unexpected error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
