//! In-memory storage implementation.
//!
//! Stores everything in `BTreeMap`s behind one `Arc<RwLock<..>>`, so clones
//! share the same data and the store can be handed to request handlers on
//! any thread. Used by the test suites and by `--in-memory` server runs.

use crate::domain::{
    Board, BoardId, Project, ProjectId, Sprint, SprintId, WorkItem, WorkItemId,
};
use crate::storage::{BoardStore, IdCounters};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    counters: IdCounters,
    projects: BTreeMap<ProjectId, Project>,
    boards: BTreeMap<BoardId, Board>,
    sprints: BTreeMap<SprintId, Sprint>,
    work_items: BTreeMap<WorkItemId, WorkItem>,
}

/// In-memory storage backend.
///
/// # Examples
///
/// ```
/// use cloudboard::domain::Project;
/// use cloudboard::storage::{BoardStore, InMemoryStorage};
///
/// let storage = InMemoryStorage::new();
/// let project = storage
///     .insert_project(Project::new("Apollo".to_string(), String::new(), 1))
///     .unwrap();
///
/// let shared = storage.clone();
/// assert_eq!(shared.load_project(project.id).unwrap().unwrap().name, "Apollo");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }
}

fn replace<K: Ord + Copy + std::fmt::Display, V: Clone>(
    map: &mut BTreeMap<K, V>,
    kind: &str,
    id: K,
    value: &V,
) -> Result<()> {
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(anyhow!("{} not found: {}", kind, id)),
    }
}

fn remove<K: Ord + Copy + std::fmt::Display, V>(
    map: &mut BTreeMap<K, V>,
    kind: &str,
    id: K,
) -> Result<()> {
    map.remove(&id)
        .map(|_| ())
        .ok_or_else(|| anyhow!("{} not found: {}", kind, id))
}

impl BoardStore for InMemoryStorage {
    fn init(&self) -> Result<()> {
        // No initialization needed for in-memory storage
        Ok(())
    }

    fn insert_project(&self, mut project: Project) -> Result<Project> {
        let mut tables = self.write()?;
        project.id = tables.counters.next_project();
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    fn load_project(&self, id: ProjectId) -> Result<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    fn save_project(&self, project: &Project) -> Result<()> {
        replace(&mut self.write()?.projects, "Project", project.id, project)
    }

    fn delete_project(&self, id: ProjectId) -> Result<()> {
        remove(&mut self.write()?.projects, "Project", id)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.read()?.projects.values().cloned().collect())
    }

    fn insert_board(&self, mut board: Board) -> Result<Board> {
        let mut tables = self.write()?;
        board.id = tables.counters.next_board();
        tables.counters.number_columns(&mut board);
        tables.boards.insert(board.id, board.clone());
        Ok(board)
    }

    fn load_board(&self, id: BoardId) -> Result<Option<Board>> {
        Ok(self.read()?.boards.get(&id).cloned())
    }

    fn save_board(&self, mut board: Board) -> Result<Board> {
        let mut tables = self.write()?;
        if !tables.boards.contains_key(&board.id) {
            return Err(anyhow!("Board not found: {}", board.id));
        }
        tables.counters.number_columns(&mut board);
        tables.boards.insert(board.id, board.clone());
        Ok(board)
    }

    fn delete_board(&self, id: BoardId) -> Result<()> {
        remove(&mut self.write()?.boards, "Board", id)
    }

    fn list_boards(&self) -> Result<Vec<Board>> {
        Ok(self.read()?.boards.values().cloned().collect())
    }

    fn insert_sprint(&self, mut sprint: Sprint) -> Result<Sprint> {
        let mut tables = self.write()?;
        sprint.id = tables.counters.next_sprint();
        tables.sprints.insert(sprint.id, sprint.clone());
        Ok(sprint)
    }

    fn load_sprint(&self, id: SprintId) -> Result<Option<Sprint>> {
        Ok(self.read()?.sprints.get(&id).cloned())
    }

    fn save_sprint(&self, sprint: &Sprint) -> Result<()> {
        replace(&mut self.write()?.sprints, "Sprint", sprint.id, sprint)
    }

    fn delete_sprint(&self, id: SprintId) -> Result<()> {
        remove(&mut self.write()?.sprints, "Sprint", id)
    }

    fn list_sprints(&self) -> Result<Vec<Sprint>> {
        Ok(self.read()?.sprints.values().cloned().collect())
    }

    fn insert_work_item(&self, mut item: WorkItem) -> Result<WorkItem> {
        let mut tables = self.write()?;
        item.id = tables.counters.next_work_item();
        tables.work_items.insert(item.id, item.clone());
        Ok(item)
    }

    fn load_work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>> {
        Ok(self.read()?.work_items.get(&id).cloned())
    }

    fn save_work_item(&self, item: &WorkItem) -> Result<()> {
        replace(&mut self.write()?.work_items, "Work item", item.id, item)
    }

    fn save_work_items(&self, items: &[WorkItem]) -> Result<()> {
        let mut tables = self.write()?;
        if let Some(missing) = items.iter().find(|i| !tables.work_items.contains_key(&i.id)) {
            return Err(anyhow!("Work item not found: {}", missing.id));
        }
        for item in items {
            tables.work_items.insert(item.id, item.clone());
        }
        Ok(())
    }

    fn delete_work_item(&self, id: WorkItemId) -> Result<()> {
        remove(&mut self.write()?.work_items, "Work item", id)
    }

    fn list_work_items(&self) -> Result<Vec<WorkItem>> {
        Ok(self.read()?.work_items.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardType, WorkItemType};

    #[test]
    fn test_init_is_noop() {
        let storage = InMemoryStorage::new();
        storage.init().unwrap();
        storage.init().unwrap();
    }

    #[test]
    fn test_ids_increase_per_kind() {
        let storage = InMemoryStorage::new();
        let p1 = storage
            .insert_project(Project::new("A".to_string(), String::new(), 1))
            .unwrap();
        let p2 = storage
            .insert_project(Project::new("B".to_string(), String::new(), 1))
            .unwrap();
        let item = storage
            .insert_work_item(WorkItem::new("X".to_string(), WorkItemType::Task, p1.id))
            .unwrap();

        assert_eq!((p1.id, p2.id), (1, 2));
        assert_eq!(item.id, 1);
    }

    #[test]
    fn test_save_updates_existing_item() {
        let storage = InMemoryStorage::new();
        let mut item = storage
            .insert_work_item(WorkItem::new("Original".to_string(), WorkItemType::Bug, 1))
            .unwrap();

        item.title = "Updated".to_string();
        storage.save_work_item(&item).unwrap();

        assert_eq!(storage.load_work_item(item.id).unwrap().unwrap().title, "Updated");
        assert_eq!(storage.list_work_items().unwrap().len(), 1);
    }

    #[test]
    fn test_save_unknown_item_fails() {
        let storage = InMemoryStorage::new();
        let mut item = WorkItem::new("Ghost".to_string(), WorkItemType::Task, 1);
        item.id = 42;

        let err = storage.save_work_item(&item).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(storage.save_work_items(&[item]).is_err());
    }

    #[test]
    fn test_batch_save_is_all_or_nothing() {
        let storage = InMemoryStorage::new();
        let mut a = storage
            .insert_work_item(WorkItem::new("A".to_string(), WorkItemType::Task, 1))
            .unwrap();
        let mut ghost = WorkItem::new("Ghost".to_string(), WorkItemType::Task, 1);
        ghost.id = 99;

        a.backlog_order = Some(500);
        assert!(storage.save_work_items(&[a.clone(), ghost]).is_err());
        assert_eq!(storage.load_work_item(a.id).unwrap().unwrap().backlog_order, None);
    }

    #[test]
    fn test_delete_and_load_missing() {
        let storage = InMemoryStorage::new();
        let board = storage
            .insert_board(Board::new(1, "Main".to_string(), BoardType::Scrum))
            .unwrap();

        storage.delete_board(board.id).unwrap();
        assert!(storage.load_board(board.id).unwrap().is_none());
        assert!(storage.delete_board(board.id).is_err());
    }
}
