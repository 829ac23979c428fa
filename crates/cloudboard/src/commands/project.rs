//! Project CRUD operations

use super::*;
use crate::board_columns::{build_columns, default_columns};
use crate::domain::BoardType;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CloudBoardError::invalid("Project name cannot be empty"));
    }
    Ok(name.to_string())
}

impl<S: BoardStore> CommandExecutor<S> {
    /// Creates a project owned by `user`, together with a default Kanban
    /// board carrying the default columns.
    pub fn create_project(&self, user: UserId, new: NewProject) -> Result<Project> {
        let name = validate_name(&new.name)?;
        let _guard = self.write_guard()?;

        let project = self
            .storage
            .insert_project(Project::new(name.clone(), new.description, user))?;

        let mut board = Board::new(project.id, name, BoardType::Kanban);
        board.description = Some("Default Kanban board".to_string());
        board.columns = build_columns(&default_columns());
        let board = self.storage.insert_board(board)?;

        info!(project_id = project.id, board_id = board.id, user, "created project");
        Ok(project)
    }

    pub fn get_project(&self, user: UserId, id: ProjectId) -> Result<Project> {
        self.authorize_project(id, user)
    }

    pub fn list_projects(&self, user: UserId) -> Result<Vec<Project>> {
        Ok(self.storage.projects_owned_by(user)?)
    }

    pub fn update_project(&self, user: UserId, id: ProjectId, update: ProjectUpdate) -> Result<Project> {
        let name = validate_name(&update.name)?;
        let _guard = self.write_guard()?;

        let mut project = self.authorize_project(id, user)?;
        project.name = name;
        project.description = update.description;
        self.storage.save_project(&project)?;
        Ok(project)
    }

    /// Deletes the project with all its boards, sprints and work items
    pub fn delete_project(&self, user: UserId, id: ProjectId) -> Result<()> {
        let _guard = self.write_guard()?;
        self.authorize_project(id, user)?;

        for item in self.storage.work_items_in_project(id)? {
            self.storage.delete_work_item(item.id)?;
        }
        for board in self.storage.boards_in_project(id)? {
            for sprint in self.storage.sprints_on_board(board.id)? {
                self.storage.delete_sprint(sprint.id)?;
            }
            self.storage.delete_board(board.id)?;
        }
        self.storage.delete_project(id)?;

        Self::log_deleted("project", id);
        Ok(())
    }
}
