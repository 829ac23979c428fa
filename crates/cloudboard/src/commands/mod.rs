//! Orchestration layer for every board operation.
//!
//! The `CommandExecutor` runs the validators before committing mutations,
//! checks project ownership for the acting user, and assigns backlog orders.
//!
//! This module is organized into submodules by functional area:
//! - `project`: project CRUD, default board creation, cascading delete
//! - `board`: board CRUD and column sync
//! - `work_item`: work item CRUD, hierarchy moves, board and sprint moves
//! - `backlog`: backlog listing and reordering
//! - `sprint`: sprint lifecycle, stats and burndown

mod backlog;
mod board;
mod project;
mod sprint;
mod work_item;

#[cfg(test)]
pub mod test_helpers;

pub use board::{BoardUpdate, NewBoard};
pub use project::{NewProject, ProjectUpdate};
pub use sprint::{BurndownPoint, NewSprint, SprintCompletion, SprintStats, SprintSummary, SprintUpdate};
pub use work_item::{NewWorkItem, WorkItemHierarchy, WorkItemUpdate, UpdatedWorkItem};

// Common imports used across modules
use crate::backlog::next_backlog_order;
use crate::config::CloudBoardConfig;
use crate::domain::{
    Board, BoardId, LoadedWorkItem, Project, ProjectId, Sprint, SprintId, UserId, WorkItem,
    WorkItemId,
};
use crate::errors::{CloudBoardError, Result};
use crate::storage::BoardStore;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Executes board operations with business logic and validation.
///
/// Generic over storage backend. Mutating operations hold `write_lock` for
/// their whole check-then-act sequence, so two requests in one process can
/// never interleave between a hierarchy check and the write it guards.
pub struct CommandExecutor<S: BoardStore> {
    storage: S,
    config: CloudBoardConfig,
    write_lock: Mutex<()>,
}

impl<S: BoardStore> CommandExecutor<S> {
    /// Create a new command executor with default configuration
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, CloudBoardConfig::default())
    }

    pub fn with_config(storage: S, config: CloudBoardConfig) -> Self {
        Self {
            storage,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Get reference to the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &CloudBoardConfig {
        &self.config
    }

    /// Initialize the storage backend
    pub fn init(&self) -> Result<()> {
        self.storage.init()?;
        Ok(())
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>> {
        // Guards no data, so a poisoned lock is still usable
        Ok(self.write_lock.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn require_project(&self, id: ProjectId) -> Result<Project> {
        self.storage
            .load_project(id)?
            .ok_or_else(|| CloudBoardError::not_found("Project", id))
    }

    fn require_board(&self, id: BoardId) -> Result<Board> {
        self.storage
            .load_board(id)?
            .ok_or_else(|| CloudBoardError::not_found("Board", id))
    }

    fn require_sprint(&self, id: SprintId) -> Result<Sprint> {
        self.storage
            .load_sprint(id)?
            .ok_or_else(|| CloudBoardError::not_found("Sprint", id))
    }

    fn require_work_item(&self, id: WorkItemId) -> Result<WorkItem> {
        self.storage
            .load_work_item(id)?
            .ok_or_else(|| CloudBoardError::not_found("Work item", id))
    }

    /// Loads the project and checks that `user` owns it
    fn authorize_project(&self, project_id: ProjectId, user: UserId) -> Result<Project> {
        let project = self.require_project(project_id)?;
        if project.owner_id != user {
            debug!(project_id, user, "rejected: not the project owner");
            return Err(CloudBoardError::not_owner());
        }
        Ok(project)
    }

    fn authorize_board(&self, board_id: BoardId, user: UserId) -> Result<Board> {
        let board = self.require_board(board_id)?;
        self.authorize_project(board.project_id, user)?;
        Ok(board)
    }

    fn authorize_sprint(&self, sprint_id: SprintId, user: UserId) -> Result<(Sprint, Board)> {
        let sprint = self.require_sprint(sprint_id)?;
        let board = self.authorize_board(sprint.board_id, user)?;
        Ok((sprint, board))
    }

    fn authorize_work_item(&self, item_id: WorkItemId, user: UserId) -> Result<WorkItem> {
        let item = self.require_work_item(item_id)?;
        self.authorize_project(item.project_id, user)?;
        Ok(item)
    }

    /// Resolves the item's parent and direct children from the store
    fn load_relations(&self, item: WorkItem) -> Result<LoadedWorkItem> {
        let parent = match item.parent_id {
            Some(parent_id) => self.storage.load_work_item(parent_id)?,
            None => None,
        };
        let children = self.storage.children_of(item.id)?;
        Ok(LoadedWorkItem {
            item,
            parent,
            children,
        })
    }

    /// Backlog order for a new item in the project+parent scope
    fn next_order(&self, project_id: ProjectId, parent_id: Option<WorkItemId>) -> Result<i64> {
        let max = self.storage.max_backlog_order(project_id, parent_id)?;
        next_backlog_order(max, self.config.order_step()).ok_or_else(|| {
            CloudBoardError::invalid(format!(
                "Backlog order overflow in project {}; reorder the backlog first",
                project_id
            ))
        })
    }

    fn log_created(kind: &str, id: i64) {
        info!(kind, id, "created");
    }

    fn log_deleted(kind: &str, id: i64) {
        info!(kind, id, "deleted");
    }
}
