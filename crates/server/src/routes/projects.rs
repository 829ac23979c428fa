//! `/projects` routes

use super::{AppState, Id, Payload};
use crate::auth::ActingUser;
use crate::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cloudboard::commands::{NewProject, ProjectUpdate};
use cloudboard::domain::{Project, ProjectId};
use cloudboard::storage::BoardStore;

pub fn routes<S: BoardStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

async fn list_projects<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(executor.list_projects(user)?))
}

async fn create_project<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Payload(new): Payload<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = executor.create_project(user, new)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<ProjectId>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(executor.get_project(user, id)?))
}

async fn update_project<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<ProjectId>,
    Payload(update): Payload<ProjectUpdate>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(executor.update_project(user, id, update)?))
}

async fn delete_project<S: BoardStore>(
    State(executor): State<AppState<S>>,
    ActingUser(user): ActingUser,
    Id(id): Id<ProjectId>,
) -> Result<StatusCode, ApiError> {
    executor.delete_project(user, id)?;
    Ok(StatusCode::NO_CONTENT)
}
