//! Board CRUD operations and column sync

use super::*;
use crate::board_columns::{
    build_columns, default_columns, plan_column_sync, validate_columns,
    validate_columns_for_update, ColumnSpec,
};
use crate::domain::BoardType;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub board_type: BoardType,
    /// Default columns are used when absent or empty
    #[serde(default)]
    pub columns: Option<Vec<ColumnSpec>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub board_type: BoardType,
    /// Replacement column set; columns are left alone when absent
    #[serde(default)]
    pub columns: Option<Vec<ColumnSpec>>,
}

fn validate_board_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CloudBoardError::invalid("Board name cannot be empty"));
    }
    Ok(name.to_string())
}

impl<S: BoardStore> CommandExecutor<S> {
    pub fn create_board(&self, user: UserId, project_id: ProjectId, new: NewBoard) -> Result<Board> {
        let name = validate_board_name(&new.name)?;
        let specs = match new.columns {
            Some(columns) if !columns.is_empty() => {
                validate_columns(&columns)?;
                columns
            }
            _ => default_columns(),
        };

        let _guard = self.write_guard()?;
        self.authorize_project(project_id, user)?;

        let mut board = Board::new(project_id, name, new.board_type);
        board.description = new.description;
        board.columns = build_columns(&specs);
        let board = self.storage.insert_board(board)?;

        Self::log_created("board", board.id);
        Ok(board)
    }

    pub fn get_board(&self, user: UserId, id: BoardId) -> Result<Board> {
        self.authorize_board(id, user)
    }

    pub fn list_boards(&self, user: UserId, project_id: ProjectId) -> Result<Vec<Board>> {
        self.authorize_project(project_id, user)?;
        Ok(self.storage.boards_in_project(project_id)?)
    }

    /// Updates board fields and, when columns are given, syncs them.
    ///
    /// Items in a deleted column move to the leftmost new column; items in
    /// a renamed column follow the new name.
    pub fn update_board(&self, user: UserId, id: BoardId, update: BoardUpdate) -> Result<Board> {
        let name = validate_board_name(&update.name)?;
        if let Some(columns) = &update.columns {
            validate_columns_for_update(columns)?;
        }

        let _guard = self.write_guard()?;
        let mut board = self.authorize_board(id, user)?;

        board.name = name;
        board.description = update.description;
        board.board_type = update.board_type;

        let Some(specs) = update.columns else {
            return Ok(self.storage.save_board(board)?);
        };

        let sync = plan_column_sync(&board.columns, &specs)?;
        board.columns = sync.columns.clone();
        let board = self.storage.save_board(board)?;

        let moved: Vec<WorkItem> = self
            .storage
            .work_items_on_board(id)?
            .into_iter()
            .filter_map(|mut item| {
                let status = sync.remap(&item.status)?.to_string();
                item.status = status;
                Some(item)
            })
            .collect();
        if !moved.is_empty() {
            self.storage.save_work_items(&moved)?;
            info!(board_id = id, count = moved.len(), "reassigned items after column sync");
        }

        Ok(board)
    }

    /// Deletes the board. Its items go back to the project backlog without
    /// a sprint; its sprints are deleted.
    pub fn delete_board(&self, user: UserId, id: BoardId) -> Result<()> {
        let _guard = self.write_guard()?;
        let board = self.authorize_board(id, user)?;

        for mut item in self.storage.work_items_on_board(id)? {
            item.board_id = None;
            item.sprint_id = None;
            item.backlog_order = Some(self.next_order(board.project_id, item.parent_id)?);
            self.storage.save_work_item(&item)?;
        }
        for sprint in self.storage.sprints_on_board(id)? {
            self.storage.delete_sprint(sprint.id)?;
        }
        self.storage.delete_board(id)?;

        Self::log_deleted("board", id);
        Ok(())
    }
}
