//! Axum extractor for validated request bodies
//!
//! `ValidatedJson<T>` parses the JSON body into `T` and runs its
//! `validator::Validate` rules before the handler sees it.

use crate::core::error::{FoundationError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Axum extractor that deserializes and validates a JSON payload
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn insert_document(
///     ValidatedJson(input): ValidatedJson<TestRecordInput>,
/// ) -> FoundationResult<Json<WriteResponse>> {
///     // input already satisfies its length rules
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = FoundationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<T> = Json::from_request(req, state).await.map_err(|e| {
            ValidationError::InvalidJson {
                message: e.body_text(),
            }
        })?;

        payload.validate().map_err(ValidationError::from)?;

        Ok(ValidatedJson(payload))
    }
}
