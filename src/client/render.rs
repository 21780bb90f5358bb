//! Terminal rendering of dashboard responses

use super::{ClientError, OperationKind};
use crate::core::{HealthReport, StoreStatus};
use serde_json::Value;

fn status_marker(status: StoreStatus) -> &'static str {
    match status {
        StoreStatus::Up => "[ok]",
        StoreStatus::Down => "[!!]",
    }
}

/// One status line per datastore
pub fn render_health(report: &HealthReport) -> String {
    format!(
        "{} MongoDB (document store): {}\n{} Neo4j (graph store): {}",
        status_marker(report.document_store),
        report.document_store.to_string().to_uppercase(),
        status_marker(report.graph_store),
        report.graph_store.to_string().to_uppercase(),
    )
}

/// Render a successful response for the given operation
pub fn render_response(kind: OperationKind, body: &Value) -> String {
    if kind == OperationKind::Health {
        if let Ok(report) = serde_json::from_value::<HealthReport>(body.clone()) {
            return render_health(&report);
        }
    }

    let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());

    match body.get("message").and_then(Value::as_str) {
        Some(message) => {
            let mut out = message.to_string();
            if let Some(id) = body.get("id").and_then(Value::as_str) {
                out.push_str(&format!("\nid: {}", id));
            }
            out.push('\n');
            out.push_str(&pretty);
            out
        }
        None => pretty,
    }
}

/// Failures are shown with the server's message unchanged
pub fn render_failure(err: &ClientError) -> String {
    match err {
        ClientError::Api { status, message, .. } => format!("Error ({}): {}", status, message),
        other => format!("Error: {}", other),
    }
}
