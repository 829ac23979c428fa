//! `/boards` routes and the boards of a project

use super::{AppState, Id, Payload};
use crate::auth::ActingUser;
use crate::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cloudboard::commands::{BoardUpdate, NewBoard};
use cloudboard::domain::{Board, BoardId, ProjectId};
use cloudboard::storage::BoardStore;

pub fn routes<S: BoardStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/projects/:id/boards",
            get(list_boards).post(create_board),
        )
        .route(
            "/boards/:id",
            get(get_board).put(update_board).delete(delete_board),
        )
}

async fn list_boards<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(project_id): Id<ProjectId>,
) -> Result<Json<Vec<Board>>, ApiError> {
    Ok(Json(executor.list_boards(user, project_id)?))
}

async fn create_board<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(project_id): Id<ProjectId>,
    Payload(new): Payload<NewBoard>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let board = executor.create_board(user, project_id, new)?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn get_board<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<BoardId>,
) -> Result<Json<Board>, ApiError> {
    Ok(Json(executor.get_board(user, id)?))
}

/// Column changes move affected items in the same request
async fn update_board<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<BoardId>,
    Payload(update): Payload<BoardUpdate>,
) -> Result<Json<Board>, ApiError> {
    Ok(Json(executor.update_board(user, id, update)?))
}

async fn delete_board<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<BoardId>,
) -> Result<StatusCode, ApiError> {
    executor.delete_board(user, id)?;
    Ok(StatusCode::NO_CONTENT)
}
