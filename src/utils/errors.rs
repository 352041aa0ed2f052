//! Error handling for BloodLink
//!
//! This module defines the main error type used throughout the application
//! and maps every variant onto the HTTP status and `{"error"}` body the
//! frontend expects.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for CHECK constraint violations
const CHECK_VIOLATION: &str = "23514";

/// Main error type for BloodLink application
#[derive(Error, Debug)]
pub enum BloodLinkError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Cannot change status from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Too many attempts, try again later")]
    RateLimitExceeded,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for BloodLink operations
pub type Result<T> = std::result::Result<T, BloodLinkError>;

impl From<sqlx::Error> for BloodLinkError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return BloodLinkError::Conflict(conflict_message(db_err.constraint()));
            }
            if db_err.code().as_deref() == Some(CHECK_VIOLATION) {
                return BloodLinkError::InvalidInput("Request violates a data constraint".to_string());
            }
        }
        BloodLinkError::Database(err)
    }
}

impl From<config::ConfigError> for BloodLinkError {
    fn from(err: config::ConfigError) -> Self {
        BloodLinkError::Config(err.to_string())
    }
}

impl From<JsonRejection> for BloodLinkError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                BloodLinkError::InvalidInput("Expected a JSON request body".to_string())
            }
            other => BloodLinkError::InvalidInput(other.body_text()),
        }
    }
}

impl From<PathRejection> for BloodLinkError {
    fn from(rejection: PathRejection) -> Self {
        BloodLinkError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for BloodLinkError {
    fn from(rejection: QueryRejection) -> Self {
        BloodLinkError::InvalidInput(rejection.body_text())
    }
}

/// Human readable message for a violated unique index
fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(name) if name.contains("email") => "Email is already registered".to_string(),
        Some(name) if name.contains("phone") => "Phone number is already registered".to_string(),
        Some(name) if name.contains("one_open") => "You already have an open registration; withdraw it first".to_string(),
        _ => "Record already exists".to_string(),
    }
}

impl BloodLinkError {
    pub fn not_found(entity: &'static str) -> Self {
        BloodLinkError::NotFound { entity }
    }

    /// HTTP status returned to the client for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BloodLinkError::InvalidInput(_)
            | BloodLinkError::InvalidStateTransition { .. }
            | BloodLinkError::Conflict(_) => StatusCode::BAD_REQUEST,
            BloodLinkError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BloodLinkError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            BloodLinkError::NotFound { .. } => StatusCode::NOT_FOUND,
            BloodLinkError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BloodLinkError::Database(_) => ErrorSeverity::Critical,
            BloodLinkError::Migration(_) => ErrorSeverity::Critical,
            BloodLinkError::Config(_) => ErrorSeverity::Critical,
            BloodLinkError::PermissionDenied(_) => ErrorSeverity::Warning,
            BloodLinkError::Authentication(_) => ErrorSeverity::Warning,
            BloodLinkError::RateLimitExceeded => ErrorSeverity::Warning,
            BloodLinkError::InvalidInput(_)
            | BloodLinkError::NotFound { .. }
            | BloodLinkError::Conflict(_)
            | BloodLinkError::InvalidStateTransition { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

impl IntoResponse for BloodLinkError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the logs
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, severity = %self.severity(), "Request failed");
            "Internal server error".to_string()
        } else {
            if self.severity() == ErrorSeverity::Warning {
                warn!(error = %self, "Request rejected");
            }
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
