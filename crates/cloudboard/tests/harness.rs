//! Test harness for in-process workflow tests against the JSON backend

use cloudboard::commands::{CommandExecutor, NewProject, NewWorkItem};
use cloudboard::domain::{Board, Project, UserId, WorkItem, WorkItemId, WorkItemType};
use cloudboard::storage::{BoardStore, JsonFileStorage};
use std::path::PathBuf;
use tempfile::TempDir;

pub const OWNER: UserId = 7;

/// Isolated data directory with an executor over it
pub struct TestHarness {
    _temp: TempDir,
    pub executor: CommandExecutor<JsonFileStorage>,
    pub storage: JsonFileStorage,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp.path());
        storage.init().unwrap();
        let executor = CommandExecutor::new(storage.clone());
        Self {
            _temp: temp,
            executor,
            storage,
        }
    }

    #[allow(dead_code)]
    pub fn root(&self) -> PathBuf {
        self._temp.path().to_path_buf()
    }

    pub fn project(&self, name: &str) -> Project {
        self.executor
            .create_project(
                OWNER,
                NewProject {
                    name: name.to_string(),
                    description: String::new(),
                },
            )
            .unwrap()
    }

    #[allow(dead_code)]
    pub fn board(&self, project: &Project) -> Board {
        self.executor
            .list_boards(OWNER, project.id)
            .unwrap()
            .remove(0)
    }

    /// Backlog item, optionally under a parent
    pub fn item(
        &self,
        project: &Project,
        title: &str,
        item_type: WorkItemType,
        parent: Option<WorkItemId>,
    ) -> WorkItem {
        let mut new = NewWorkItem::new(title, item_type);
        new.parent_id = parent;
        self.executor
            .create_backlog_item(OWNER, project.id, new)
            .unwrap()
    }
}
