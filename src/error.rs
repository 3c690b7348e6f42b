use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::ingestion::ValidationError;
use crate::kafka::SinkError;

pub type AppResult<T> = Result<T, AppError>;

// ============================================================================
// Ingestion errors
// ============================================================================

/// Typed failure of a single message, on both the single and the bulk path
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid JSON: {0}")]
    Parse(String),

    #[error("Payload validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Producer service is not available")]
    NotReady,

    #[error("{0}")]
    Publish(String),
}

impl IngestError {
    /// Stable name of the failure class, used to key bulk error samples
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Parse(_) => "ParseError",
            IngestError::Validation(_) => "ValidationError",
            IngestError::NotReady => "NotReadyError",
            IngestError::Publish(_) => "PublishError",
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Parse(err.to_string())
    }
}

impl From<SinkError> for IngestError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::NotStarted => IngestError::NotReady,
            other => IngestError::Publish(other.to_string()),
        }
    }
}

// ============================================================================
// HTTP errors
// ============================================================================

/// Error returned by HTTP handlers, rendered as `{"status":"error","message":...}`
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Publish(String),

    #[error("{0}")]
    NotReady(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Publish(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Publish(_) => "PUBLISH_ERROR",
            AppError::NotReady(_) => "NOT_READY",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the caller. Internal errors stay opaque.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn not_ready() -> Self {
        AppError::NotReady(IngestError::NotReady.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Parse(_) | IngestError::Validation(_) => {
                AppError::Validation(err.to_string())
            }
            IngestError::NotReady => AppError::not_ready(),
            IngestError::Publish(msg) => AppError::Publish(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "status": "error",
            "message": self.user_message(),
        });

        (status, Json(body)).into_response()
    }
}
