//! Domain error types for the recognition server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Every error leaves the server in the same envelope: `{message, detail, code}`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Envelope code for client errors other than validation failures.
pub const HTTP_ERROR: &str = "HTTP_ERROR";
/// Envelope code for malformed request shapes.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Envelope code for server-side failures.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

const INTERNAL_MESSAGE: &str = "internal server error";
const VALIDATION_MESSAGE: &str = "validation failed";

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client sent a request that cannot be processed (missing or invalid file)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Uploaded payload exceeds the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Request shape is malformed
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Blob write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else that should never reach the client verbatim
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error for a single field location.
    pub fn validation(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        AppError::Validation {
            message: VALIDATION_MESSAGE.to_string(),
            errors: vec![FieldError {
                loc: loc.iter().map(|s| s.to_string()).collect(),
                msg: msg.into(),
                kind: kind.to_string(),
            }],
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation { message, errors } => {
                tracing::warn!("Request validation failed: {:?}", errors);
                ErrorResponse {
                    message: message.clone(),
                    detail: message.clone(),
                    code: VALIDATION_ERROR.to_string(),
                    errors: Some(errors.clone()),
                }
            }
            AppError::Storage(_) | AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!("{}", self);
                ErrorResponse::new(INTERNAL_MESSAGE, INTERNAL_ERROR)
            }
            _ => {
                tracing::warn!("HTTP error: {} | {}", self.status_code().as_u16(), self);
                ErrorResponse::new(&self.to_string(), HTTP_ERROR)
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    pub detail: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    /// Envelope with `detail` mirroring `message` and no field errors.
    pub fn new(message: &str, code: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: message.to_string(),
            code: code.to_string(),
            errors: None,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// One field-level problem inside a validation error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    /// Location of the offending field, e.g. `["body", "file"]`
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
