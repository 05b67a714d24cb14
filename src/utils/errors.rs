//! Error handling for the event management API
//!
//! This module defines the main error type used throughout the application,
//! the field-level validation error map, and how every error is rendered as
//! an HTTP response.

use std::collections::BTreeMap;
use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Field-level validation messages, keyed by field name.
///
/// Serialized as `{"field": ["message", ...]}`, the shape REST clients of
/// this API already parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error map holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", err.code));
                fields.add(field.to_string(), message);
            }
        }
        fields
    }
}

/// Main error type for the event management API
#[derive(Error, Debug)]
pub enum EventManagementError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    #[error("No route for {0}")]
    UnknownPath(String),

    #[error("Token encoding error: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Mail delivery error: {0}")]
    Mail(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Result type alias for event management operations
pub type Result<T> = std::result::Result<T, EventManagementError>;

impl EventManagementError {
    pub fn event_not_found(id: i64) -> Self {
        EventManagementError::NotFound { resource: "Event", id }
    }

    pub fn user_not_found(id: i64) -> Self {
        EventManagementError::NotFound { resource: "User", id }
    }

    /// HTTP status the error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventManagementError::Validation(_) | EventManagementError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            EventManagementError::Unauthenticated(_) | EventManagementError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            EventManagementError::Forbidden(_) => StatusCode::FORBIDDEN,
            EventManagementError::NotFound { .. } | EventManagementError::UnknownPath(_) => {
                StatusCode::NOT_FOUND
            }
            EventManagementError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventManagementError::Database(_) => ErrorSeverity::Critical,
            EventManagementError::Migration(_) => ErrorSeverity::Critical,
            EventManagementError::Config(_) => ErrorSeverity::Critical,
            EventManagementError::ConfigLoad(_) => ErrorSeverity::Critical,
            EventManagementError::Forbidden(_) => ErrorSeverity::Warning,
            EventManagementError::Unauthenticated(_) => ErrorSeverity::Warning,
            EventManagementError::InvalidToken(_) => ErrorSeverity::Warning,
            EventManagementError::RateLimitExceeded => ErrorSeverity::Warning,
            EventManagementError::Validation(_) => ErrorSeverity::Info,
            EventManagementError::BadRequest(_) => ErrorSeverity::Info,
            EventManagementError::NotFound { .. } => ErrorSeverity::Info,
            EventManagementError::UnknownPath(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            EventManagementError::Validation(fields) => json!(fields),
            EventManagementError::BadRequest(message)
            | EventManagementError::Unauthenticated(message)
            | EventManagementError::Forbidden(message) => json!({ "detail": message }),
            EventManagementError::InvalidToken(message) => {
                json!({ "detail": message, "code": "token_not_valid" })
            }
            EventManagementError::NotFound { .. } | EventManagementError::UnknownPath(_) => {
                json!({ "detail": "Not found." })
            }
            EventManagementError::RateLimitExceeded => {
                json!({ "detail": "Request was throttled." })
            }
            _ => json!({ "detail": "A server error occurred." }),
        }
    }
}

impl From<JsonRejection> for EventManagementError {
    fn from(rejection: JsonRejection) -> Self {
        EventManagementError::BadRequest(format!("JSON parse error - {}", rejection.body_text()))
    }
}

impl IntoResponse for EventManagementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                error!(status = %status, severity = %self.severity(), error = %self, "Request failed")
            }
            ErrorSeverity::Warning => warn!(status = %status, error = %self, "Request rejected"),
            ErrorSeverity::Info => debug!(status = %status, error = %self, "Request rejected"),
        }

        (status, Json(self.body())).into_response()
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

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
