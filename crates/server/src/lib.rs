//! CloudBoard REST API Server Library
//!
//! Exposes projects, boards, the backlog, work items and sprints over HTTP
//! under `/api`. Handlers call straight into the `cloudboard` command layer.

pub mod auth;
pub mod error;
pub mod routes;

use axum::Router;
use cloudboard::commands::CommandExecutor;
use cloudboard::storage::BoardStore;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Re-export for convenience
pub use routes::create_routes;

/// Full application: `/api` routes with CORS and request tracing
pub fn app<S: BoardStore>(executor: Arc<CommandExecutor<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", create_routes(executor))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
