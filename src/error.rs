use crate::services::identifier::IdGenerationError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Identifier generation failed: {0}")]
    IdentifierGeneration(#[from] IdGenerationError),

    /// Malformed URL, too-short custom code, unparseable body
    #[error("{0}")]
    InvalidInput(String),

    /// API key does not belong to the claimed user
    #[error("{0}")]
    Unauthorized(String),

    /// Code or user ID already taken
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Request body over the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Environment variable missing: {0}")]
    MissingEnvVar(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error renders with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::Unauthorized(_)
            | AppError::Conflict(_)
            | AppError::NotFound(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(rejection.body_text());
        }
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error occurred".to_string()
            }
            AppError::Migration(e) => {
                tracing::error!("Migration error: {:?}", e);
                "Migration error occurred".to_string()
            }
            AppError::IdentifierGeneration(e) => {
                tracing::error!("Identifier generation error: {}", e);
                self.to_string()
            }
            AppError::InvalidInput(_)
            | AppError::Unauthorized(_)
            | AppError::Conflict(_)
            | AppError::NotFound(_)
            | AppError::PayloadTooLarge(_) => self.to_string(),
            _ => {
                tracing::error!("Internal error: {}", self);
                "An internal error occurred".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for AppResult
pub type AppResult<T> = Result<T, AppError>;
