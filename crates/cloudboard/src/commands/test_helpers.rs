//! Shared fixtures for command tests

use super::*;
use crate::domain::WorkItemType;
use crate::storage::InMemoryStorage;
use chrono::{Duration, TimeZone, Utc};

pub const OWNER: UserId = 1;
pub const STRANGER: UserId = 2;

pub fn setup() -> CommandExecutor<InMemoryStorage> {
    let executor = CommandExecutor::new(InMemoryStorage::new());
    executor.init().unwrap();
    executor
}

pub fn create_project(executor: &CommandExecutor<InMemoryStorage>) -> Project {
    executor
        .create_project(
            OWNER,
            NewProject {
                name: "Test Project".to_string(),
                description: "Fixture".to_string(),
            },
        )
        .unwrap()
}

/// The board created together with the project
pub fn default_board(executor: &CommandExecutor<InMemoryStorage>, project_id: ProjectId) -> Board {
    executor
        .list_boards(OWNER, project_id)
        .unwrap()
        .into_iter()
        .next()
        .unwrap()
}

pub fn backlog_item(
    executor: &CommandExecutor<InMemoryStorage>,
    project_id: ProjectId,
    title: &str,
    item_type: WorkItemType,
    parent_id: Option<WorkItemId>,
) -> WorkItem {
    let mut new = NewWorkItem::new(title, item_type);
    new.parent_id = parent_id;
    executor.create_backlog_item(OWNER, project_id, new).unwrap()
}

pub fn board_item(
    executor: &CommandExecutor<InMemoryStorage>,
    board_id: BoardId,
    title: &str,
    item_type: WorkItemType,
    parent_id: Option<WorkItemId>,
) -> WorkItem {
    let mut new = NewWorkItem::new(title, item_type);
    new.parent_id = parent_id;
    executor.create_board_item(OWNER, board_id, new).unwrap()
}

/// Ten-day sprint starting 2024-03-01
pub fn create_sprint(executor: &CommandExecutor<InMemoryStorage>, board_id: BoardId) -> Sprint {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    executor
        .create_sprint(
            OWNER,
            board_id,
            NewSprint {
                name: "Sprint 1".to_string(),
                start_date: start,
                end_date: start + Duration::days(9),
                goal: None,
            },
        )
        .unwrap()
}
