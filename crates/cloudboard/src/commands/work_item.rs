//! Work item CRUD, hierarchy moves and board/sprint assignment

use super::*;
use crate::domain::{Priority, WorkItemType, DEFAULT_STATUS};
use crate::hierarchy::HierarchyGraph;
use crate::type_hierarchy::validate_parent_child;
use crate::validation::{validate_delete, validate_type_change};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkItem {
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the leftmost column on a board, "To Do" in the backlog
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub parent_id: Option<WorkItemId>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
}

impl NewWorkItem {
    pub fn new(title: impl Into<String>, item_type: WorkItemType) -> Self {
        Self {
            title: title.into(),
            item_type,
            description: None,
            status: None,
            priority: Priority::default(),
            due_date: None,
            estimated_hours: None,
            parent_id: None,
            assigned_to: None,
        }
    }

    pub fn with_parent(mut self, parent_id: WorkItemId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Full-field update; every field replaces the stored value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemUpdate {
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub parent_id: Option<WorkItemId>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
}

impl From<&WorkItem> for WorkItemUpdate {
    fn from(item: &WorkItem) -> Self {
        Self {
            title: item.title.clone(),
            item_type: item.item_type,
            description: item.description.clone(),
            status: item.status.clone(),
            priority: item.priority,
            due_date: item.due_date,
            estimated_hours: item.estimated_hours,
            actual_hours: item.actual_hours,
            parent_id: item.parent_id,
            assigned_to: item.assigned_to,
        }
    }
}

/// An updated item plus any non-blocking validation warnings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedWorkItem {
    pub item: WorkItem,
    pub warnings: Vec<String>,
}

/// A work item with its hierarchy context and roll-ups
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemHierarchy {
    pub item: WorkItem,
    pub parent: Option<WorkItem>,
    pub children: Vec<WorkItem>,
    pub depth: usize,
    pub breadcrumb: String,
    pub total_estimated_hours: Option<f64>,
    pub total_actual_hours: Option<f64>,
    pub completion_percentage: f64,
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CloudBoardError::invalid("Title cannot be empty"));
    }
    Ok(title.to_string())
}

fn require_column(board: &Board, status: &str) -> Result<()> {
    if board.has_column(status) {
        return Ok(());
    }
    Err(CloudBoardError::invalid(format!(
        "Status '{}' is not a column of board {}",
        status, board.id
    )))
}

impl<S: BoardStore> CommandExecutor<S> {
    /// Parent must exist, live in the same project and accept `child_type`.
    fn check_parent(
        &self,
        project_id: ProjectId,
        parent_id: WorkItemId,
        child_type: WorkItemType,
    ) -> Result<WorkItem> {
        let parent = self.require_work_item(parent_id)?;
        if parent.project_id != project_id {
            return Err(CloudBoardError::invalid(
                "Parent must belong to the same project",
            ));
        }
        validate_parent_child(parent.item_type, child_type)?;
        Ok(parent)
    }

    /// Cycle walk over the project's items, then parent legality
    fn check_reparent(
        &self,
        item: &WorkItem,
        new_parent_id: Option<WorkItemId>,
        item_type: WorkItemType,
    ) -> Result<Option<WorkItem>> {
        let items = self.storage.work_items_in_project(item.project_id)?;
        HierarchyGraph::new(&items).validate_no_cycle(item.id, new_parent_id)?;

        new_parent_id
            .map(|parent_id| self.check_parent(item.project_id, parent_id, item_type))
            .transpose()
    }

    fn build_item(&self, project_id: ProjectId, user: UserId, new: NewWorkItem) -> Result<WorkItem> {
        let mut item = WorkItem::new(validate_title(&new.title)?, new.item_type, project_id);
        item.description = new.description;
        item.priority = new.priority;
        item.due_date = new.due_date;
        item.estimated_hours = new.estimated_hours;
        item.assigned_to = new.assigned_to;
        item.created_by = Some(user);
        if let Some(parent_id) = new.parent_id {
            self.check_parent(project_id, parent_id, new.item_type)?;
            item.parent_id = Some(parent_id);
        }
        if let Some(status) = new.status {
            item.status = status;
        }
        Ok(item)
    }

    /// Creates a work item on a board; the project comes from the board
    pub fn create_board_item(&self, user: UserId, board_id: BoardId, new: NewWorkItem) -> Result<WorkItem> {
        let _guard = self.write_guard()?;
        let board = self.authorize_board(board_id, user)?;

        let explicit_status = new.status.is_some();
        let mut item = self.build_item(board.project_id, user, new)?;
        item.board_id = Some(board.id);
        if explicit_status {
            require_column(&board, &item.status)?;
        } else if let Some(column) = board.leftmost_column() {
            item.status = column.name.clone();
        }

        let item = self.storage.insert_work_item(item)?;
        Self::log_created("work item", item.id);
        Ok(item)
    }

    /// Creates a work item in the project backlog at the end of its scope
    pub fn create_backlog_item(&self, user: UserId, project_id: ProjectId, new: NewWorkItem) -> Result<WorkItem> {
        let _guard = self.write_guard()?;
        self.authorize_project(project_id, user)?;

        let mut item = self.build_item(project_id, user, new)?;
        if item.status.trim().is_empty() {
            item.status = DEFAULT_STATUS.to_string();
        }
        item.backlog_order = Some(self.next_order(project_id, item.parent_id)?);

        let item = self.storage.insert_work_item(item)?;
        Self::log_created("work item", item.id);
        Ok(item)
    }

    pub fn get_work_item(&self, user: UserId, id: WorkItemId) -> Result<WorkItem> {
        self.authorize_work_item(id, user)
    }

    /// Item with parent, children, position in the tree and roll-ups
    pub fn get_work_item_hierarchy(&self, user: UserId, id: WorkItemId) -> Result<WorkItemHierarchy> {
        let item = self.authorize_work_item(id, user)?;
        let items = self.storage.work_items_in_project(item.project_id)?;
        let graph = HierarchyGraph::new(&items);

        Ok(WorkItemHierarchy {
            parent: item.parent_id.and_then(|p| graph.get(p)).cloned(),
            children: graph.children(id).into_iter().cloned().collect(),
            depth: graph.depth(id),
            breadcrumb: graph.breadcrumb(id, " / "),
            total_estimated_hours: graph.total_estimated_hours(id),
            total_actual_hours: graph.total_actual_hours(id),
            completion_percentage: graph.completion_percentage(id),
            item,
        })
    }

    pub fn list_board_items(&self, user: UserId, board_id: BoardId) -> Result<Vec<WorkItem>> {
        self.authorize_board(board_id, user)?;
        Ok(self.storage.work_items_on_board(board_id)?)
    }

    /// Board items whose parent is not on the same board, by type then id
    pub fn list_board_roots(&self, user: UserId, board_id: BoardId) -> Result<Vec<WorkItem>> {
        self.authorize_board(board_id, user)?;
        let items = self.storage.work_items_on_board(board_id)?;
        Ok(HierarchyGraph::new(&items)
            .roots()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Root first, the item itself last
    pub fn path_to_root(&self, user: UserId, id: WorkItemId) -> Result<Vec<WorkItem>> {
        let item = self.authorize_work_item(id, user)?;
        let items = self.storage.work_items_in_project(item.project_id)?;
        Ok(HierarchyGraph::new(&items)
            .path_to_root(id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Replaces every field of the item.
    ///
    /// A parent change runs the cycle walk and validates the new parent
    /// against the new type. A type change validates against the new parent
    /// and the current children; its warnings are returned with the item.
    pub fn update_work_item(
        &self,
        user: UserId,
        id: WorkItemId,
        update: WorkItemUpdate,
    ) -> Result<UpdatedWorkItem> {
        let title = validate_title(&update.title)?;
        let _guard = self.write_guard()?;
        let mut item = self.authorize_work_item(id, user)?;

        let parent_changed = update.parent_id != item.parent_id;
        let new_parent = if parent_changed {
            self.check_reparent(&item, update.parent_id, update.item_type)?
        } else {
            match item.parent_id {
                Some(parent_id) => self.storage.load_work_item(parent_id)?,
                None => None,
            }
        };

        let mut warnings = Vec::new();
        if update.item_type != item.item_type {
            let loaded = LoadedWorkItem {
                item: item.clone(),
                parent: new_parent,
                children: self.storage.children_of(id)?,
            };
            let report = validate_type_change(&loaded, update.item_type).map_err(|e| {
                debug!(id, error = %e, "type change rejected");
                e
            })?;
            warnings = report.warnings;
        }

        if let Some(board_id) = item.board_id {
            if update.status != item.status {
                require_column(&self.require_board(board_id)?, &update.status)?;
            }
        }

        item.title = title;
        item.item_type = update.item_type;
        item.description = update.description;
        item.status = update.status;
        item.priority = update.priority;
        item.due_date = update.due_date;
        item.estimated_hours = update.estimated_hours;
        item.actual_hours = update.actual_hours;
        item.assigned_to = update.assigned_to;
        if parent_changed {
            item.parent_id = update.parent_id;
            if item.is_in_backlog() {
                item.backlog_order = Some(self.next_order(item.project_id, item.parent_id)?);
            }
        }

        self.storage.save_work_item(&item)?;
        Ok(UpdatedWorkItem { item, warnings })
    }

    /// Re-parents an item (or detaches it with `None`).
    pub fn move_to_parent(
        &self,
        user: UserId,
        id: WorkItemId,
        new_parent_id: Option<WorkItemId>,
    ) -> Result<WorkItem> {
        let _guard = self.write_guard()?;
        let mut item = self.authorize_work_item(id, user)?;

        if new_parent_id == item.parent_id {
            return Ok(item);
        }
        self.check_reparent(&item, new_parent_id, item.item_type)
            .map_err(|e| {
                debug!(id, ?new_parent_id, error = %e, "move rejected");
                e
            })?;

        item.parent_id = new_parent_id;
        if item.is_in_backlog() {
            item.backlog_order = Some(self.next_order(item.project_id, new_parent_id)?);
        }
        self.storage.save_work_item(&item)?;
        info!(id, ?new_parent_id, "moved work item");
        Ok(item)
    }

    /// Moves an item onto a board of its project, or back to the backlog with `None`.
    pub fn move_to_board(
        &self,
        user: UserId,
        id: WorkItemId,
        board_id: Option<BoardId>,
    ) -> Result<WorkItem> {
        let _guard = self.write_guard()?;
        let mut item = self.authorize_work_item(id, user)?;

        match board_id {
            Some(board_id) => {
                let board = self.require_board(board_id)?;
                if board.project_id != item.project_id {
                    return Err(CloudBoardError::invalid(format!(
                        "Board {} does not belong to project {}",
                        board_id, item.project_id
                    )));
                }
                if item.board_id != Some(board_id) {
                    item.sprint_id = None;
                }
                if !board.has_column(&item.status) {
                    if let Some(column) = board.leftmost_column() {
                        item.status = column.name.clone();
                    }
                }
                item.board_id = Some(board_id);
                item.backlog_order = None;
            }
            None => {
                if item.is_in_backlog() {
                    return Ok(item);
                }
                item.board_id = None;
                item.sprint_id = None;
                item.backlog_order = Some(self.next_order(item.project_id, item.parent_id)?);
            }
        }

        self.storage.save_work_item(&item)?;
        info!(id, ?board_id, "moved work item to board");
        Ok(item)
    }

    /// Deletes an item that has no direct children
    pub fn delete_work_item(&self, user: UserId, id: WorkItemId) -> Result<()> {
        let _guard = self.write_guard()?;
        let item = self.authorize_work_item(id, user)?;

        let loaded = self.load_relations(item)?;
        validate_delete(&loaded).map_err(|e| {
            debug!(id, error = %e, "delete rejected");
            e
        })?;

        self.storage.delete_work_item(id)?;
        Self::log_deleted("work item", id);
        Ok(())
    }

    /// Puts an item into a sprint of its board, or takes it out with `None`
    pub fn assign_to_sprint(
        &self,
        user: UserId,
        id: WorkItemId,
        sprint_id: Option<SprintId>,
    ) -> Result<WorkItem> {
        let _guard = self.write_guard()?;
        let mut item = self.authorize_work_item(id, user)?;

        if let Some(sprint_id) = sprint_id {
            let sprint = self.require_sprint(sprint_id)?;
            if item.board_id != Some(sprint.board_id) {
                return Err(CloudBoardError::invalid(
                    "Sprint must belong to the same board",
                ));
            }
        }

        item.sprint_id = sprint_id;
        self.storage.save_work_item(&item)?;
        Ok(item)
    }
}
