use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::config::is_production;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown failure: {0}")]
    Unknown(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(errors.to_string())
    }
}

// Extractor rejections are client errors and go out in the same envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidInput(format!("Malformed form data: {}", rejection.body_text()))
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_)
            | AppError::UploadFailed(_)
            | AppError::Database(_)
            | AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::UploadFailed(_) => "UPLOAD_FAILED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Unknown(_) => "UNKNOWN_FAILURE",
        }
    }

    /// Message safe to show any client.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Configuration(_) => "Server configuration error".to_string(),
            AppError::UploadFailed(_) => "Image upload failed".to_string(),
            AppError::Database(_) => "A database error occurred".to_string(),
            AppError::Unknown(_) => "An unexpected error occurred".to_string(),
        }
    }

    fn log(&self) {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) => {
                tracing::debug!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::Database(e) => {
                error!(error = ?e, "Database error");
            }
            _ => {
                error!(error = ?self, "Application error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        // Internal error text only leaves the process outside production.
        let details = match &self {
            AppError::InvalidInput(_) | AppError::NotFound(_) => None,
            _ if is_production() => None,
            other => Some(json!({ "error": other.to_string() })),
        };

        error_response(self.code(), self.public_message(), details, self.status_code())
    }
}
