//! Typed error handling for the foundation API
//!
//! Handlers return [`FoundationError`] so that every failure reaches the
//! caller as a JSON body with a stable code and a human-readable message.
//!
//! # Error Categories
//!
//! - [`ConnectionError`]: a datastore is unreachable, unconfigured or closed
//! - [`StorageError`]: a write or read was rejected by the datastore
//! - [`RecordError`]: the requested test record does not exist
//! - [`ValidationError`]: the request payload or query is invalid
//! - [`ConfigError`]: the process configuration is invalid
//!
//! # Example
//!
//! ```rust,ignore
//! use gst_foundation::prelude::*;
//!
//! async fn load(store: &dyn DocumentStore, id: &str) -> FoundationResult<TestRecord> {
//!     store
//!         .get(id)
//!         .await
//!         .map_err(|e| StorageError::from_anyhow(StoreKind::Document, "read", e))?
//!         .ok_or_else(|| RecordError::not_found(StoreKind::Document, id).into())
//! }
//! ```

use crate::core::service::StoreKind;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type of the foundation API
#[derive(Debug)]
pub enum FoundationError {
    /// A datastore handle could not be obtained
    Connection(ConnectionError),

    /// A datastore rejected an operation
    Storage(StorageError),

    /// A test record was not found
    Record(RecordError),

    /// Request validation errors
    Validation(ValidationError),

    /// Configuration errors
    Config(ConfigError),
}

impl fmt::Display for FoundationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoundationError::Connection(e) => write!(f, "{}", e),
            FoundationError::Storage(e) => write!(f, "{}", e),
            FoundationError::Record(e) => write!(f, "{}", e),
            FoundationError::Validation(e) => write!(f, "{}", e),
            FoundationError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FoundationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FoundationError::Connection(e) => Some(e),
            FoundationError::Storage(e) => Some(e),
            FoundationError::Record(e) => Some(e),
            FoundationError::Validation(e) => Some(e),
            FoundationError::Config(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl FoundationError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FoundationError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            FoundationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FoundationError::Record(_) => StatusCode::NOT_FOUND,
            FoundationError::Validation(e) => e.status_code(),
            FoundationError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            FoundationError::Connection(_) => "STORE_UNAVAILABLE",
            FoundationError::Storage(_) => "STORAGE_ERROR",
            FoundationError::Record(_) => "RECORD_NOT_FOUND",
            FoundationError::Validation(e) => e.error_code(),
            FoundationError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            FoundationError::Connection(e) => Some(serde_json::json!({
                "store": e.store.as_str(),
            })),
            FoundationError::Storage(e) => Some(serde_json::json!({
                "store": e.store.as_str(),
                "operation": e.operation,
            })),
            FoundationError::Record(RecordError::NotFound { store, id }) => {
                Some(serde_json::json!({
                    "store": store.as_str(),
                    "id": id,
                }))
            }
            FoundationError::Record(RecordError::Empty { store }) => Some(serde_json::json!({
                "store": store.as_str(),
            })),
            FoundationError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for FoundationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Connection Errors
// =============================================================================

/// A datastore handle is not available
#[derive(Debug)]
pub struct ConnectionError {
    pub store: StoreKind,
    pub reason: String,
}

impl ConnectionError {
    pub fn new(store: StoreKind, reason: impl Into<String>) -> Self {
        Self {
            store,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is unavailable: {}", self.store, self.reason)
    }
}

impl std::error::Error for ConnectionError {}

impl From<ConnectionError> for FoundationError {
    fn from(err: ConnectionError) -> Self {
        FoundationError::Connection(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// A datastore rejected a write or read
#[derive(Debug)]
pub struct StorageError {
    pub store: StoreKind,
    pub operation: String,
    pub message: String,
}

impl StorageError {
    pub fn new(store: StoreKind, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            store,
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Wrap a backend error, keeping the full context chain in the message
    pub fn from_anyhow(store: StoreKind, operation: &str, err: anyhow::Error) -> Self {
        Self::new(store, operation, format!("{:#}", err))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} failed: {}", self.store, self.operation, self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for FoundationError {
    fn from(err: StorageError) -> Self {
        FoundationError::Storage(err)
    }
}

// =============================================================================
// Record Errors
// =============================================================================

/// The requested test record does not exist
#[derive(Debug)]
pub enum RecordError {
    /// No record with this id
    NotFound { store: StoreKind, id: String },

    /// The store holds no test records yet
    Empty { store: StoreKind },
}

impl RecordError {
    pub fn not_found(store: StoreKind, id: impl Into<String>) -> Self {
        RecordError::NotFound {
            store,
            id: id.into(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NotFound { store, id } => {
                write!(f, "Test record '{}' not found in {}", id, store)
            }
            RecordError::Empty { store } => {
                write!(f, "No test records found in {}", store)
            }
        }
    }
}

impl std::error::Error for RecordError {}

impl From<RecordError> for FoundationError {
    fn from(err: RecordError) -> Self {
        FoundationError::Record(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON body
    InvalidJson { message: String },

    /// Invalid query string
    InvalidQuery { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::FieldErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationError::InvalidJson { .. } | ValidationError::InvalidQuery { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            ValidationError::InvalidQuery { .. } => "INVALID_QUERY",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::InvalidQuery { message } => {
                write!(f, "Invalid query: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for FoundationError {
    fn from(err: ValidationError) -> Self {
        FoundationError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to process configuration
#[derive(Debug)]
pub enum ConfigError {
    /// A value could not be parsed
    InvalidValue { key: String, reason: String },

    /// The configuration file could not be read or parsed
    File { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {}: {}", key, reason)
            }
            ConfigError::File { path, message } => {
                write!(f, "Failed to load configuration from {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for FoundationError {
    fn from(err: ConfigError) -> Self {
        FoundationError::Config(err)
    }
}

/// A specialized Result type for foundation operations
pub type FoundationResult<T> = Result<T, FoundationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display_names_store() {
        let err = ConnectionError::new(StoreKind::Document, "MONGO_URI is not set");
        assert_eq!(
            err.to_string(),
            "MongoDB is unavailable: MONGO_URI is not set"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = RecordError::not_found(StoreKind::Graph, "abc");
        assert_eq!(err.to_string(), "Test record 'abc' not found in Neo4j");
    }

    #[test]
    fn test_not_found_details_carry_id() {
        let err: FoundationError = RecordError::not_found(StoreKind::Document, "abc").into();
        let response = err.to_response();
        assert_eq!(response.code, "RECORD_NOT_FOUND");
        let details = response.details.unwrap();
        assert_eq!(details["id"], "abc");
        assert_eq!(details["store"], "documentStore");
    }

    #[test]
    fn test_storage_error_keeps_context_chain() {
        let err = anyhow::anyhow!("connection reset").context("Failed to insert document");
        let storage = StorageError::from_anyhow(StoreKind::Document, "insert", err);
        assert!(storage.message.contains("Failed to insert document"));
        assert!(storage.message.contains("connection reset"));
    }

    #[test]
    fn test_validation_status_codes() {
        assert_eq!(
            ValidationError::FieldErrors(vec![FieldValidationError {
                field: "value".into(),
                message: "too long".into(),
            }])
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ValidationError::InvalidJson {
                message: "eof".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
