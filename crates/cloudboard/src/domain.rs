//! Core domain types for the board tracker.
//!
//! This module defines the data structures persisted by the storage layer:
//! projects, boards with their workflow columns, sprints, and the work items
//! that form the Epic → Feature → PBI → Task hierarchy.
//!
//! Relationships are expressed as ids only. A work item never embeds its
//! parent or children; callers resolve them through the store (see
//! [`LoadedWorkItem`] and [`crate::hierarchy::HierarchyGraph`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProjectId = i64;
pub type BoardId = i64;
pub type ColumnId = i64;
pub type SprintId = i64;
pub type WorkItemId = i64;
pub type UserId = i64;

/// Status assigned to new work items when none is given.
pub const DEFAULT_STATUS: &str = "To Do";

/// Status that marks a work item as finished for roll-ups and sprint stats.
pub const DONE_STATUS: &str = "Done";

/// Status counted as active work in sprint stats.
pub const IN_PROGRESS_STATUS: &str = "In Progress";

/// Level of a work item in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkItemType {
    /// Top-level initiative
    Epic,
    /// Deliverable capability under an epic
    Feature,
    /// Product backlog item
    #[serde(rename = "PBI")]
    Pbi,
    /// Leaf unit of work
    Task,
    /// Defect; may sit under any container type but never has children
    Bug,
}

/// Work item priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    /// Default priority
    #[default]
    Medium,
    High,
    Critical,
}

/// Board flavour. Only affects presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoardType {
    #[default]
    Kanban,
    Scrum,
    Backlog,
}

/// Workflow category of a board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnCategory {
    /// Not started
    #[default]
    Proposed,
    /// Active work
    InProgress,
    /// Complete
    Resolved,
}

/// Sprint lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SprintStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

/// A project owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create an unsaved project; the store assigns the id on insert
    pub fn new(name: String, description: String, owner_id: UserId) -> Self {
        Self {
            id: 0,
            name,
            description,
            owner_id,
            created_at: Utc::now(),
        }
    }
}

/// A configurable column in a board's workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub id: ColumnId,
    /// Display name, also used as the status of work items in this column
    pub name: String,
    /// Zero-based position (0 = leftmost)
    pub order: i32,
    pub category: ColumnCategory,
}

/// A board inside a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub board_type: BoardType,
    /// Columns sorted by `order`
    pub columns: Vec<BoardColumn>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    /// Create an unsaved board without columns
    pub fn new(project_id: ProjectId, name: String, board_type: BoardType) -> Self {
        Self {
            id: 0,
            project_id,
            name,
            description: None,
            board_type,
            columns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Column with the lowest order, if the board has any columns
    pub fn leftmost_column(&self) -> Option<&BoardColumn> {
        self.columns.iter().min_by_key(|c| c.order)
    }

    /// Returns true if `status` names one of this board's columns
    pub fn has_column(&self, status: &str) -> bool {
        self.columns.iter().any(|c| c.name == status)
    }
}

/// A time-boxed iteration on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: SprintId,
    pub board_id: BoardId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub goal: Option<String>,
    pub status: SprintStatus,
    pub created_at: DateTime<Utc>,
}

/// A unit of work at some level of the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: WorkItemId,
    pub title: String,
    pub description: Option<String>,
    /// Free-form status; on a board it names one of the board's columns
    pub status: String,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub project_id: ProjectId,
    /// `None` means the item lives in the project backlog
    pub board_id: Option<BoardId>,
    pub sprint_id: Option<SprintId>,
    pub parent_id: Option<WorkItemId>,
    /// Relative ordering inside the backlog; values need not be contiguous
    pub backlog_order: Option<i64>,
    pub created_by: Option<UserId>,
    pub assigned_to: Option<UserId>,
}

impl WorkItem {
    /// Create an unsaved work item with default status and priority
    pub fn new(title: String, item_type: WorkItemType, project_id: ProjectId) -> Self {
        Self {
            id: 0,
            title,
            description: None,
            status: DEFAULT_STATUS.to_string(),
            priority: Priority::default(),
            item_type,
            created_at: Utc::now(),
            due_date: None,
            estimated_hours: None,
            actual_hours: None,
            project_id,
            board_id: None,
            sprint_id: None,
            parent_id: None,
            backlog_order: None,
            created_by: None,
            assigned_to: None,
        }
    }

    /// Returns true if the item is in the project backlog (not on a board)
    pub fn is_in_backlog(&self) -> bool {
        self.board_id.is_none()
    }

    pub fn is_done(&self) -> bool {
        self.status == DONE_STATUS
    }
}

/// A work item with its parent and direct children resolved from the store.
///
/// This is the shape the delete and type-change validators operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedWorkItem {
    pub item: WorkItem,
    pub parent: Option<WorkItem>,
    pub children: Vec<WorkItem>,
}

impl LoadedWorkItem {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
