//! Process and datastore health

use super::AppState;
use crate::core::HealthReport;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

/// `GET /` - confirms the API process is running
pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Backend is running."
    }))
}

/// `GET /health` - pings both datastores concurrently
///
/// Always answers 200; a store that fails or times out is reported `down`.
pub async fn health_check(State(connections): State<AppState>) -> Json<HealthReport> {
    let (document_up, graph_up) = tokio::join!(
        connections.ping_document_store(),
        connections.ping_graph_store()
    );

    let report = HealthReport::new(document_up, graph_up);
    tracing::debug!(
        document_store = %report.document_store,
        graph_store = %report.graph_store,
        "health check"
    );
    Json(report)
}
