//! HTTP handlers for the health and smoke-test routes
//!
//! Handlers are stateless: each one borrows a store handle from the shared
//! [`ConnectionManager`](crate::core::ConnectionManager), performs a single
//! write or read, and returns the outcome.

pub mod document;
pub mod graph;
pub mod health;

use crate::core::ConnectionManager;
use crate::core::error::{FoundationResult, ValidationError};
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use std::sync::Arc;

/// Application state shared across handlers
pub type AppState = Arc<ConnectionManager>;

/// Unwrap a query string, turning axum's rejection into a JSON error
pub(crate) fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> FoundationResult<T> {
    query.map(|Query(q)| q).map_err(|e| {
        ValidationError::InvalidQuery {
            message: e.body_text(),
        }
        .into()
    })
}

/// Treat `?id=` (blank) the same as no id
pub(crate) fn requested_id(id: Option<String>) -> Option<String> {
    id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty())
}
