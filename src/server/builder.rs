//! ServerBuilder for fluent API to build and run the HTTP server

use super::handlers::AppState;
use super::router::build_router;
use crate::core::ConnectionManager;
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the foundation HTTP server
///
/// # Example
///
/// ```ignore
/// let connections = ConnectionManager::connect(&config).await;
/// ServerBuilder::new()
///     .with_connections(connections)
///     .serve("127.0.0.1:8000")
///     .await?;
/// ```
pub struct ServerBuilder {
    connections: Option<AppState>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            connections: None,
        }
    }

    /// Set the connection manager (required)
    pub fn with_connections(mut self, connections: ConnectionManager) -> Self {
        self.connections = Some(Arc::new(connections));
        self
    }

    /// Set an already shared connection manager
    pub fn with_shared_connections(mut self, connections: AppState) -> Self {
        self.connections = Some(connections);
        self
    }

    /// Build the router, returning it with the shared connection manager
    pub fn build_parts(self) -> Result<(Router, AppState)> {
        let connections = self
            .connections
            .ok_or_else(|| anyhow!("Connection manager is required. Call .with_connections()"))?;

        let app = build_router(connections.clone());
        Ok((app, connections))
    }

    /// Build the final router
    pub fn build(self) -> Result<Router> {
        Ok(self.build_parts()?.0)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    /// - Release both datastore connections once serving stops
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on an existing listener until `shutdown` resolves
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let (app, connections) = self.build_parts()?;
        let addr = listener.local_addr()?;

        tracing::info!("Server listening on {}", addr);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        connections.shutdown().await;
        tracing::info!("Server shutdown complete");

        served.map_err(Into::into)
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryDocumentStore, InMemoryGraphStore};

    fn connections() -> ConnectionManager {
        ConnectionManager::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryGraphStore::new()),
        )
    }

    #[test]
    fn test_build_requires_connections() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("with_connections"));
    }

    #[test]
    fn test_build_with_connections() {
        assert!(ServerBuilder::new().with_connections(connections()).build().is_ok());
    }

    #[tokio::test]
    async fn test_built_router_serves_only_the_fixed_route_table() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let app = ServerBuilder::new()
            .with_connections(connections())
            .build()
            .unwrap();

        let health = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let extra = app
            .oneshot(Request::get("/custom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(extra.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_on_releases_connections_after_shutdown() {
        let shared = Arc::new(connections());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        ServerBuilder::new()
            .with_shared_connections(shared.clone())
            .serve_on(listener, async {})
            .await
            .unwrap();

        assert!(!shared.ping_document_store().await);
        assert!(shared.graph_store().is_err());
    }
}
