//! Storage abstraction layer for projects, boards, sprints and work items.
//!
//! This module defines the `BoardStore` trait that abstracts persistence,
//! allowing the JSON file backend and the in-memory backend to be used
//! interchangeably by the command layer.
//!
//! Stores assign ids on insert, starting at 1 and increasing per entity
//! kind. Relationships are ids only; the derived helpers on the trait are
//! the fetches the command layer needs to resolve them.

use crate::domain::{
    Board, BoardId, Project, ProjectId, Sprint, SprintId, UserId, WorkItem, WorkItemId,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod json;
pub mod lock;
pub mod memory;

pub use json::JsonFileStorage;
pub use lock::FileLocker;
pub use memory::InMemoryStorage;

/// Next id per entity kind; each counter holds the last id handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IdCounters {
    pub project: i64,
    pub board: i64,
    pub column: i64,
    pub sprint: i64,
    pub work_item: i64,
}

impl IdCounters {
    fn bump(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    pub fn next_project(&mut self) -> ProjectId {
        Self::bump(&mut self.project)
    }

    pub fn next_board(&mut self) -> BoardId {
        Self::bump(&mut self.board)
    }

    pub fn next_sprint(&mut self) -> SprintId {
        Self::bump(&mut self.sprint)
    }

    pub fn next_work_item(&mut self) -> WorkItemId {
        Self::bump(&mut self.work_item)
    }

    /// Number the board's unsaved columns (id 0) and keep them sorted by order.
    pub fn number_columns(&mut self, board: &mut Board) {
        for column in board.columns.iter_mut().filter(|c| c.id == 0) {
            column.id = Self::bump(&mut self.column);
        }
        board.columns.sort_by_key(|c| c.order);
    }
}

/// Trait for storage backends.
///
/// `insert_*` assigns a fresh id and returns the stored record; `save_*`
/// replaces an existing record and fails if it does not exist; `load_*`
/// returns `None` for unknown ids; `delete_*` fails for unknown ids.
///
/// # Examples
///
/// ```
/// use cloudboard::domain::{WorkItem, WorkItemType};
/// use cloudboard::storage::{BoardStore, InMemoryStorage};
///
/// let storage = InMemoryStorage::new();
/// storage.init().unwrap();
///
/// let item = storage
///     .insert_work_item(WorkItem::new("Login".to_string(), WorkItemType::Feature, 1))
///     .unwrap();
/// assert_eq!(item.id, 1);
/// assert_eq!(storage.load_work_item(1).unwrap().unwrap().title, "Login");
/// ```
pub trait BoardStore: Clone + Send + Sync + 'static {
    /// Initialize the storage backend (idempotent).
    fn init(&self) -> Result<()>;

    fn insert_project(&self, project: Project) -> Result<Project>;
    fn load_project(&self, id: ProjectId) -> Result<Option<Project>>;
    fn save_project(&self, project: &Project) -> Result<()>;
    fn delete_project(&self, id: ProjectId) -> Result<()>;
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// Inserts the board, numbering any columns with id 0.
    fn insert_board(&self, board: Board) -> Result<Board>;
    fn load_board(&self, id: BoardId) -> Result<Option<Board>>;
    /// Saves the board, numbering any columns with id 0.
    fn save_board(&self, board: Board) -> Result<Board>;
    fn delete_board(&self, id: BoardId) -> Result<()>;
    fn list_boards(&self) -> Result<Vec<Board>>;

    fn insert_sprint(&self, sprint: Sprint) -> Result<Sprint>;
    fn load_sprint(&self, id: SprintId) -> Result<Option<Sprint>>;
    fn save_sprint(&self, sprint: &Sprint) -> Result<()>;
    fn delete_sprint(&self, id: SprintId) -> Result<()>;
    fn list_sprints(&self) -> Result<Vec<Sprint>>;

    fn insert_work_item(&self, item: WorkItem) -> Result<WorkItem>;
    fn load_work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>>;
    fn save_work_item(&self, item: &WorkItem) -> Result<()>;
    /// Saves several items in one write. Fails without writing anything if
    /// any of them does not exist.
    fn save_work_items(&self, items: &[WorkItem]) -> Result<()>;
    fn delete_work_item(&self, id: WorkItemId) -> Result<()>;
    fn list_work_items(&self) -> Result<Vec<WorkItem>>;

    fn projects_owned_by(&self, owner: UserId) -> Result<Vec<Project>> {
        let mut projects: Vec<_> = self
            .list_projects()?
            .into_iter()
            .filter(|p| p.owner_id == owner)
            .collect();
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    fn boards_in_project(&self, project_id: ProjectId) -> Result<Vec<Board>> {
        let mut boards: Vec<_> = self
            .list_boards()?
            .into_iter()
            .filter(|b| b.project_id == project_id)
            .collect();
        boards.sort_by_key(|b| b.id);
        Ok(boards)
    }

    fn sprints_on_board(&self, board_id: BoardId) -> Result<Vec<Sprint>> {
        Ok(self
            .list_sprints()?
            .into_iter()
            .filter(|s| s.board_id == board_id)
            .collect())
    }

    fn work_items_in_project(&self, project_id: ProjectId) -> Result<Vec<WorkItem>> {
        self.filter_work_items(|w| w.project_id == project_id)
    }

    fn work_items_on_board(&self, board_id: BoardId) -> Result<Vec<WorkItem>> {
        self.filter_work_items(|w| w.board_id == Some(board_id))
    }

    fn work_items_in_sprint(&self, sprint_id: SprintId) -> Result<Vec<WorkItem>> {
        self.filter_work_items(|w| w.sprint_id == Some(sprint_id))
    }

    /// Direct children of an item
    fn children_of(&self, id: WorkItemId) -> Result<Vec<WorkItem>> {
        self.filter_work_items(|w| w.parent_id == Some(id))
    }

    /// Items of the project that are not on any board
    fn backlog(&self, project_id: ProjectId) -> Result<Vec<WorkItem>> {
        self.filter_work_items(|w| w.project_id == project_id && w.board_id.is_none())
    }

    /// Highest backlog order among the project's backlog items with the given parent
    fn max_backlog_order(
        &self,
        project_id: ProjectId,
        parent_id: Option<WorkItemId>,
    ) -> Result<Option<i64>> {
        Ok(self
            .backlog(project_id)?
            .iter()
            .filter(|w| w.parent_id == parent_id)
            .filter_map(|w| w.backlog_order)
            .max())
    }

    /// Backlog items of the project whose id is in `ids`; others are skipped
    fn backlog_items_by_ids(
        &self,
        project_id: ProjectId,
        ids: &[WorkItemId],
    ) -> Result<Vec<WorkItem>> {
        Ok(self
            .backlog(project_id)?
            .into_iter()
            .filter(|w| ids.contains(&w.id))
            .collect())
    }

    /// Work items matching `predicate`, sorted by id
    fn filter_work_items(&self, predicate: impl Fn(&WorkItem) -> bool) -> Result<Vec<WorkItem>> {
        let mut items: Vec<_> = self
            .list_work_items()?
            .into_iter()
            .filter(|w| predicate(w))
            .collect();
        items.sort_by_key(|w| w.id);
        Ok(items)
    }
}
