//! HTTP client for the foundation API, used by the dashboard
//!
//! [`DashboardClient::call`] sends one named [`Operation`] and returns the
//! decoded JSON body. Non-2xx responses become [`ClientError::Api`] carrying
//! the server's `message` unchanged, so callers can show it verbatim.

pub mod operation;
pub mod render;

pub use operation::{Operation, OperationArgs, OperationKind};

use crate::core::record::{RecordList, RelationshipList, RelationshipResponse, WriteResponse};
use crate::core::{HealthReport, RelationshipInput, TestRecord, TestRecordInput};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Default base URL of the backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The backend could not be reached
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The backend answered 2xx with a body that does not decode
    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("Operation '{operation}' requires --{argument}")]
    MissingArgument { operation: String, argument: String },
}

impl ClientError {
    /// HTTP status of an API failure
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin async client over the foundation routes
#[derive(Debug, Clone)]
pub struct DashboardClient {
    base_url: String,
    http: reqwest::Client,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                url: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one operation and return the decoded JSON body
    pub async fn call(&self, operation: &Operation) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, operation.path());
        tracing::debug!(operation = %operation.kind(), %url, "calling backend");

        let mut request = self.http.request(operation.method(), &url);
        let query = operation.query();
        if !query.is_empty() {
            request = request.query(&query);
        }
        if let Some(body) = operation.body()? {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse {
            url,
            message: e.to_string(),
        })
    }

    async fn call_typed<T: DeserializeOwned>(&self, operation: &Operation) -> Result<T, ClientError> {
        let body = self.call(operation).await?;
        serde_json::from_value(body).map_err(|e| ClientError::InvalidResponse {
            url: format!("{}{}", self.base_url, operation.path()),
            message: e.to_string(),
        })
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        self.call_typed(&Operation::Health).await
    }

    pub async fn insert_document(&self, input: TestRecordInput) -> Result<WriteResponse, ClientError> {
        self.call_typed(&Operation::InsertDocument(input)).await
    }

    pub async fn fetch_document(&self, id: Option<&str>) -> Result<TestRecord, ClientError> {
        self.call_typed(&Operation::FetchDocument {
            id: id.map(str::to_string),
        })
        .await
    }

    pub async fn recent_documents(&self, limit: Option<usize>) -> Result<RecordList, ClientError> {
        self.call_typed(&Operation::RecentDocuments { limit }).await
    }

    pub async fn create_node(&self, input: TestRecordInput) -> Result<WriteResponse, ClientError> {
        self.call_typed(&Operation::CreateNode(input)).await
    }

    pub async fn fetch_node(&self, id: Option<&str>) -> Result<TestRecord, ClientError> {
        self.call_typed(&Operation::FetchNode {
            id: id.map(str::to_string),
        })
        .await
    }

    pub async fn create_relationship(
        &self,
        input: RelationshipInput,
    ) -> Result<RelationshipResponse, ClientError> {
        self.call_typed(&Operation::CreateRelationship(input)).await
    }

    pub async fn relationships(&self, limit: Option<usize>) -> Result<RelationshipList, ClientError> {
        self.call_typed(&Operation::Relationships { limit }).await
    }
}

/// Build an API error, keeping the server's `message` when there is one
fn api_error(status: reqwest::StatusCode, body: &str) -> ClientError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let message = field("message").unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            trimmed.to_string()
        }
    });

    ClientError::Api {
        status: status.as_u16(),
        code: field("code"),
        message,
    }
}
