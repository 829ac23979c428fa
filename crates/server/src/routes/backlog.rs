//! Project backlog routes

use super::{AppState, Id, Payload};
use crate::auth::ActingUser;
use crate::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use cloudboard::backlog::BacklogPosition;
use cloudboard::commands::NewWorkItem;
use cloudboard::domain::{ProjectId, WorkItem};
use cloudboard::storage::BoardStore;
use serde::Deserialize;

pub fn routes<S: BoardStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/projects/:id/backlog",
            get(list_backlog).post(create_backlog_item),
        )
        .route("/projects/:id/backlog/order", put(reorder_backlog))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderRequest {
    items: Vec<BacklogPosition>,
}

async fn list_backlog<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(project_id): Id<ProjectId>,
) -> Result<Json<Vec<WorkItem>>, ApiError> {
    Ok(Json(executor.list_backlog(user, project_id)?))
}

async fn create_backlog_item<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(project_id): Id<ProjectId>,
    Payload(new): Payload<NewWorkItem>,
) -> Result<(StatusCode, Json<WorkItem>), ApiError> {
    let item = executor.create_backlog_item(user, project_id, new)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn reorder_backlog<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(project_id): Id<ProjectId>,
    Payload(request): Payload<ReorderRequest>,
) -> Result<Json<Vec<WorkItem>>, ApiError> {
    Ok(Json(executor.reorder_backlog(user, project_id, request.items)?))
}
