//! Route table for the foundation API

use super::handlers::{AppState, document, graph, health};
use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router
///
/// - GET  /                          - Process liveness
/// - GET  /health                    - Datastore health (`up` / `down`)
/// - POST /test/mongo                - Insert a test document
/// - GET  /test/mongo                - Fetch by `?id=` or the most recent document
/// - GET  /test/mongo/recent         - List recent documents
/// - POST /test/neo4j                - Create a test node
/// - GET  /test/neo4j                - Fetch by `?id=` or the most recent node
/// - POST /test/neo4j/relationship   - Merge two Person nodes and a relationship
/// - GET  /test/neo4j/relationships  - List Person relationships
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route(
            "/test/mongo",
            post(document::insert_document).get(document::fetch_document),
        )
        .route("/test/mongo/recent", get(document::recent_documents))
        .route(
            "/test/neo4j",
            post(graph::create_node).get(graph::fetch_node),
        )
        .route("/test/neo4j/relationship", post(graph::create_relationship))
        .route("/test/neo4j/relationships", get(graph::list_relationships))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // The dashboard may be served from another origin
                .layer(CorsLayer::permissive()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConnectionManager;
    use crate::storage::{InMemoryDocumentStore, InMemoryGraphStore};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(Arc::new(ConnectionManager::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryGraphStore::new()),
        )))
    }

    #[tokio::test]
    async fn test_root_is_ok() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app()
            .oneshot(Request::get("/test/redis").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let response = app()
            .oneshot(
                Request::post("/test/mongo/recent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_allows_other_origins() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "http://localhost:8501")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
