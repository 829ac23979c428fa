//! Sprint routes

use super::{today, AppState, Id, Payload};
use crate::auth::ActingUser;
use crate::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cloudboard::commands::{
    BurndownPoint, NewSprint, SprintCompletion, SprintStats, SprintSummary, SprintUpdate,
};
use cloudboard::domain::{BoardId, Sprint, SprintId};
use cloudboard::storage::BoardStore;

pub fn routes<S: BoardStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/boards/:id/sprints", get(list_sprints).post(create_sprint))
        .route(
            "/sprints/:id",
            get(get_sprint).put(update_sprint).delete(delete_sprint),
        )
        .route("/sprints/:id/start", post(start_sprint))
        .route("/sprints/:id/complete", post(complete_sprint))
        .route("/sprints/:id/stats", get(sprint_stats))
        .route("/sprints/:id/burndown", get(sprint_burndown))
}

async fn list_sprints<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(board_id): Id<BoardId>,
) -> Result<Json<Vec<SprintSummary>>, ApiError> {
    Ok(Json(executor.list_sprints(user, board_id, today())?))
}

async fn create_sprint<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(board_id): Id<BoardId>,
    Payload(new): Payload<NewSprint>,
) -> Result<(StatusCode, Json<Sprint>), ApiError> {
    let sprint = executor.create_sprint(user, board_id, new)?;
    Ok((StatusCode::CREATED, Json(sprint)))
}

async fn get_sprint<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<SprintId>,
) -> Result<Json<SprintSummary>, ApiError> {
    Ok(Json(executor.get_sprint(user, id, today())?))
}

async fn update_sprint<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<SprintId>,
    Payload(update): Payload<SprintUpdate>,
) -> Result<Json<Sprint>, ApiError> {
    Ok(Json(executor.update_sprint(user, id, update)?))
}

async fn delete_sprint<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<SprintId>,
) -> Result<StatusCode, ApiError> {
    executor.delete_sprint(user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn start_sprint<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<SprintId>,
) -> Result<Json<Sprint>, ApiError> {
    Ok(Json(executor.start_sprint(user, id)?))
}

async fn complete_sprint<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<SprintId>,
) -> Result<Json<SprintCompletion>, ApiError> {
    Ok(Json(executor.complete_sprint(user, id)?))
}

async fn sprint_stats<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<SprintId>,
) -> Result<Json<SprintStats>, ApiError> {
    Ok(Json(executor.sprint_stats(user, id)?))
}

async fn sprint_burndown<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<SprintId>,
) -> Result<Json<Vec<BurndownPoint>>, ApiError> {
    Ok(Json(executor.sprint_burndown(user, id, today())?))
}
