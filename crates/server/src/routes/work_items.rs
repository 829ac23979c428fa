//! Work item routes

use super::{AppState, Id, Payload};
use crate::auth::ActingUser;
use crate::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use cloudboard::commands::{NewWorkItem, UpdatedWorkItem, WorkItemHierarchy, WorkItemUpdate};
use cloudboard::domain::{BoardId, SprintId, WorkItem, WorkItemId};
use cloudboard::storage::BoardStore;
use serde::Deserialize;

pub fn routes<S: BoardStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/boards/:id/work-items",
            get(list_board_items).post(create_board_item),
        )
        .route("/boards/:id/work-items/roots", get(list_board_roots))
        .route(
            "/work-items/:id",
            get(get_work_item)
                .put(update_work_item)
                .delete(delete_work_item),
        )
        .route("/work-items/:id/hierarchy", get(get_hierarchy))
        .route("/work-items/:id/path", get(get_path))
        .route("/work-items/:id/parent", patch(move_to_parent))
        .route("/work-items/:id/board", patch(move_to_board))
        .route("/work-items/:id/sprint", patch(assign_to_sprint))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParentMove {
    parent_id: Option<WorkItemId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardMove {
    board_id: Option<BoardId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SprintAssignment {
    sprint_id: Option<SprintId>,
}

async fn list_board_items<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(board_id): Id<BoardId>,
) -> Result<Json<Vec<WorkItem>>, ApiError> {
    Ok(Json(executor.list_board_items(user, board_id)?))
}

async fn create_board_item<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(board_id): Id<BoardId>,
    Payload(new): Payload<NewWorkItem>,
) -> Result<(StatusCode, Json<WorkItem>), ApiError> {
    let item = executor.create_board_item(user, board_id, new)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn list_board_roots<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(board_id): Id<BoardId>,
) -> Result<Json<Vec<WorkItem>>, ApiError> {
    Ok(Json(executor.list_board_roots(user, board_id)?))
}

async fn get_work_item<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
) -> Result<Json<WorkItem>, ApiError> {
    Ok(Json(executor.get_work_item(user, id)?))
}

/// Returns the item along with any type-change warnings
async fn update_work_item<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
    Payload(update): Payload<WorkItemUpdate>,
) -> Result<Json<UpdatedWorkItem>, ApiError> {
    Ok(Json(executor.update_work_item(user, id, update)?))
}

async fn delete_work_item<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
) -> Result<StatusCode, ApiError> {
    executor.delete_work_item(user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_hierarchy<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
) -> Result<Json<WorkItemHierarchy>, ApiError> {
    Ok(Json(executor.get_work_item_hierarchy(user, id)?))
}

async fn get_path<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
) -> Result<Json<Vec<WorkItem>>, ApiError> {
    Ok(Json(executor.path_to_root(user, id)?))
}

async fn move_to_parent<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
    Payload(request): Payload<ParentMove>,
) -> Result<Json<WorkItem>, ApiError> {
    Ok(Json(executor.move_to_parent(user, id, request.parent_id)?))
}

async fn move_to_board<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
    Payload(request): Payload<BoardMove>,
) -> Result<Json<WorkItem>, ApiError> {
    Ok(Json(executor.move_to_board(user, id, request.board_id)?))
}

async fn assign_to_sprint<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<WorkItemId>,
    Payload(request): Payload<SprintAssignment>,
) -> Result<Json<WorkItem>, ApiError> {
    Ok(Json(executor.assign_to_sprint(user, id, request.sprint_id)?))
}
