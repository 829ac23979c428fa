//! API route definitions
//!
//! Every route except `/health` and `/work-item-types` acts on behalf of the
//! user named in the `X-User-Id` header.

mod backlog;
mod boards;
mod projects;
mod sprints;
mod work_items;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::error::{attach_instance, ApiError};
use cloudboard::commands::CommandExecutor;
use cloudboard::storage::BoardStore;
use cloudboard::type_hierarchy::{type_rules, TypeRule};

/// Shared application state
pub type AppState<S> = Arc<CommandExecutor<S>>;

/// Create API routes
pub fn create_routes<S: BoardStore>(executor: Arc<CommandExecutor<S>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/work-item-types", get(work_item_types))
        .merge(projects::routes())
        .merge(boards::routes())
        .merge(backlog::routes())
        .merge(work_items::routes())
        .merge(sprints::routes())
        .layer(middleware::from_fn(attach_instance))
        .with_state(executor)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cloudboard-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The hierarchy table, one entry per work item type
async fn work_item_types() -> Json<Vec<TypeRule>> {
    Json(type_rules())
}

/// JSON request body whose rejection is a problem response
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Payload(value))
    }
}

/// Path parameter whose rejection is a problem response
pub struct Id<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Id<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Id(value))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
