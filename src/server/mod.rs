//! HTTP server: route handlers, router and lifecycle
//!
//! The router takes the [`ConnectionManager`](crate::core::ConnectionManager)
//! as its only state; [`ServerBuilder::serve`] releases it after graceful
//! shutdown.

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use router::build_router;
