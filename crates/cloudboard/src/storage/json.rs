//! JSON file-based storage implementation.
//!
//! Each entity kind is stored as one JSON array under `data/`, next to an
//! `index.json` holding the schema version and id counters. All file writes
//! are atomic (write to temp file, then rename) and happen under an
//! exclusive lock on `<root>/.lock`.

use crate::domain::{
    Board, BoardId, Project, ProjectId, Sprint, SprintId, WorkItem, WorkItemId,
};
use crate::storage::lock::{FileLocker, LockGuard};
use crate::storage::{BoardStore, IdCounters};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DATA_DIR: &str = "data";
const INDEX_FILE: &str = "data/index.json";
const PROJECTS_FILE: &str = "data/projects.json";
const BOARDS_FILE: &str = "data/boards.json";
const SPRINTS_FILE: &str = "data/sprints.json";
const WORK_ITEMS_FILE: &str = "data/work_items.json";
const LOCK_FILE: &str = ".lock";

const SCHEMA_VERSION: u32 = 1;

/// Schema version and id counters
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Index {
    schema_version: u32,
    counters: IdCounters,
}

impl Default for Index {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            counters: IdCounters::default(),
        }
    }
}

/// Records that live in a JSON collection file
trait Record: Clone + Serialize + DeserializeOwned {
    const FILE: &'static str;
    const KIND: &'static str;
    fn id(&self) -> i64;
}

impl Record for Project {
    const FILE: &'static str = PROJECTS_FILE;
    const KIND: &'static str = "Project";
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Board {
    const FILE: &'static str = BOARDS_FILE;
    const KIND: &'static str = "Board";
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Sprint {
    const FILE: &'static str = SPRINTS_FILE;
    const KIND: &'static str = "Sprint";
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for WorkItem {
    const FILE: &'static str = WORK_ITEMS_FILE;
    const KIND: &'static str = "Work item";
    fn id(&self) -> i64 {
        self.id
    }
}

/// JSON file-based storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
    locker: FileLocker,
}

impl JsonFileStorage {
    /// Create a storage instance with the default 5 second lock timeout
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_lock_timeout(root, Duration::from_secs(5))
    }

    pub fn with_lock_timeout<P: AsRef<Path>>(root: P, timeout: Duration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            locker: FileLocker::new(timeout),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock_write(&self) -> Result<LockGuard> {
        self.locker.lock_exclusive(&self.root.join(LOCK_FILE))
    }

    fn lock_read(&self) -> Result<LockGuard> {
        self.locker.lock_shared(&self.root.join(LOCK_FILE))
    }

    fn write_json<T: Serialize + ?Sized>(&self, relative: &str, data: &T) -> Result<()> {
        let path = self.root.join(relative);
        let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).context("Failed to write temporary file")?;
        fs::rename(&temp_path, &path).context("Failed to rename temporary file")?;

        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T> {
        let path = self.root.join(relative);
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to deserialize {}", path.display()))
    }

    fn load_index(&self) -> Result<Index> {
        let index: Index = self.read_json(INDEX_FILE)?;
        if index.schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported schema version {} (expected {})",
                index.schema_version,
                SCHEMA_VERSION
            );
        }
        Ok(index)
    }

    fn save_index(&self, index: &Index) -> Result<()> {
        self.write_json(INDEX_FILE, index)
    }

    fn read_all<T: Record>(&self) -> Result<Vec<T>> {
        self.read_json(T::FILE)
    }

    fn write_all<T: Record>(&self, records: &mut Vec<T>) -> Result<()> {
        records.sort_by_key(|r| r.id());
        self.write_json(T::FILE, &*records)
    }

    fn list<T: Record>(&self) -> Result<Vec<T>> {
        let _guard = self.lock_read()?;
        self.read_all()
    }

    fn load<T: Record>(&self, id: i64) -> Result<Option<T>> {
        Ok(self.list::<T>()?.into_iter().find(|r| r.id() == id))
    }

    /// Assigns an id through `prepare`, then appends the record
    fn insert<T: Record>(
        &self,
        mut record: T,
        prepare: impl FnOnce(&mut IdCounters, &mut T),
    ) -> Result<T> {
        let _guard = self.lock_write()?;
        let mut index = self.load_index()?;
        let mut records: Vec<T> = self.read_all()?;

        prepare(&mut index.counters, &mut record);
        records.push(record.clone());

        // Counters first: a failed collection write then only skips an id
        self.save_index(&index)?;
        self.write_all(&mut records)?;
        Ok(record)
    }

    fn replace_many<T: Record>(&self, updated: &[T]) -> Result<()> {
        let _guard = self.lock_write()?;
        let mut records: Vec<T> = self.read_all()?;

        for record in updated {
            let slot = records
                .iter_mut()
                .find(|r| r.id() == record.id())
                .ok_or_else(|| anyhow!("{} not found: {}", T::KIND, record.id()))?;
            *slot = record.clone();
        }

        self.write_all(&mut records)
    }

    fn remove<T: Record>(&self, id: i64) -> Result<()> {
        let _guard = self.lock_write()?;
        let mut records: Vec<T> = self.read_all()?;

        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(anyhow!("{} not found: {}", T::KIND, id));
        }

        self.write_all(&mut records)
    }
}

impl BoardStore for JsonFileStorage {
    fn init(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(DATA_DIR)).context("Failed to create data directory")?;
        let _guard = self.lock_write()?;

        if !self.root.join(INDEX_FILE).exists() {
            self.save_index(&Index::default())?;
        }

        for file in [PROJECTS_FILE, BOARDS_FILE, SPRINTS_FILE, WORK_ITEMS_FILE] {
            if !self.root.join(file).exists() {
                self.write_json(file, &Vec::<serde_json::Value>::new())?;
            }
        }

        Ok(())
    }

    fn insert_project(&self, project: Project) -> Result<Project> {
        self.insert(project, |counters, p| p.id = counters.next_project())
    }

    fn load_project(&self, id: ProjectId) -> Result<Option<Project>> {
        self.load(id)
    }

    fn save_project(&self, project: &Project) -> Result<()> {
        self.replace_many(std::slice::from_ref(project))
    }

    fn delete_project(&self, id: ProjectId) -> Result<()> {
        self.remove::<Project>(id)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.list()
    }

    fn insert_board(&self, board: Board) -> Result<Board> {
        self.insert(board, |counters, b| {
            b.id = counters.next_board();
            counters.number_columns(b);
        })
    }

    fn load_board(&self, id: BoardId) -> Result<Option<Board>> {
        self.load(id)
    }

    fn save_board(&self, mut board: Board) -> Result<Board> {
        let _guard = self.lock_write()?;
        let mut index = self.load_index()?;
        let mut boards: Vec<Board> = self.read_all()?;

        let slot = boards
            .iter_mut()
            .find(|b| b.id == board.id)
            .ok_or_else(|| anyhow!("Board not found: {}", board.id))?;
        index.counters.number_columns(&mut board);
        *slot = board.clone();

        self.save_index(&index)?;
        self.write_all(&mut boards)?;
        Ok(board)
    }

    fn delete_board(&self, id: BoardId) -> Result<()> {
        self.remove::<Board>(id)
    }

    fn list_boards(&self) -> Result<Vec<Board>> {
        self.list()
    }

    fn insert_sprint(&self, sprint: Sprint) -> Result<Sprint> {
        self.insert(sprint, |counters, s| s.id = counters.next_sprint())
    }

    fn load_sprint(&self, id: SprintId) -> Result<Option<Sprint>> {
        self.load(id)
    }

    fn save_sprint(&self, sprint: &Sprint) -> Result<()> {
        self.replace_many(std::slice::from_ref(sprint))
    }

    fn delete_sprint(&self, id: SprintId) -> Result<()> {
        self.remove::<Sprint>(id)
    }

    fn list_sprints(&self) -> Result<Vec<Sprint>> {
        self.list()
    }

    fn insert_work_item(&self, item: WorkItem) -> Result<WorkItem> {
        self.insert(item, |counters, w| w.id = counters.next_work_item())
    }

    fn load_work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>> {
        self.load(id)
    }

    fn save_work_item(&self, item: &WorkItem) -> Result<()> {
        self.replace_many(std::slice::from_ref(item))
    }

    fn save_work_items(&self, items: &[WorkItem]) -> Result<()> {
        self.replace_many(items)
    }

    fn delete_work_item(&self, id: WorkItemId) -> Result<()> {
        self.remove::<WorkItem>(id)
    }

    fn list_work_items(&self) -> Result<Vec<WorkItem>> {
        self.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board_columns::{build_columns, default_columns};
    use crate::domain::{BoardType, WorkItemType};
    use tempfile::TempDir;

    fn setup_storage() -> (TempDir, JsonFileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path());
        storage.init().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_init_creates_directory_structure() {
        let (_temp, storage) = setup_storage();

        assert!(storage.root.join(INDEX_FILE).exists());
        assert!(storage.root.join(WORK_ITEMS_FILE).exists());
        assert!(storage.root.join(BOARDS_FILE).exists());
        assert!(storage.root.join(LOCK_FILE).exists());
    }

    #[test]
    fn test_init_is_idempotent_and_keeps_data() {
        let (_temp, storage) = setup_storage();
        storage
            .insert_project(Project::new("Keep".to_string(), String::new(), 1))
            .unwrap();

        storage.init().unwrap();
        assert_eq!(storage.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn test_insert_persists_counters_across_instances() {
        let (temp, storage) = setup_storage();
        storage
            .insert_work_item(WorkItem::new("One".to_string(), WorkItemType::Epic, 1))
            .unwrap();

        let reopened = JsonFileStorage::new(temp.path());
        let second = reopened
            .insert_work_item(WorkItem::new("Two".to_string(), WorkItemType::Epic, 1))
            .unwrap();

        assert_eq!(second.id, 2);
        assert_eq!(reopened.list_work_items().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_counter_write_leaves_no_record_behind() {
        let (_temp, storage) = setup_storage();
        let blocker = storage.root.join(INDEX_FILE).with_extension("json.tmp");
        fs::create_dir(&blocker).unwrap();

        assert!(storage
            .insert_work_item(WorkItem::new("Lost".to_string(), WorkItemType::Epic, 1))
            .is_err());
        assert!(storage.list_work_items().unwrap().is_empty());

        fs::remove_dir(&blocker).unwrap();
        let stored = storage
            .insert_work_item(WorkItem::new("Kept".to_string(), WorkItemType::Epic, 1))
            .unwrap();
        let ids: Vec<_> = storage.list_work_items().unwrap().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![stored.id]);
    }

    #[test]
    fn test_board_columns_are_numbered_on_insert_and_save() {
        let (_temp, storage) = setup_storage();
        let mut board = Board::new(1, "Main".to_string(), BoardType::Kanban);
        board.columns = build_columns(&default_columns());

        let mut board = storage.insert_board(board).unwrap();
        let ids: Vec<_> = board.columns.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        board.columns.pop();
        board.columns.extend(build_columns(&[crate::board_columns::ColumnSpec {
            id: None,
            name: "Review".to_string(),
            order: 2,
            category: Default::default(),
        }]));
        let saved = storage.save_board(board).unwrap();
        assert_eq!(saved.columns[2].id, 4);
        assert_eq!(storage.load_board(saved.id).unwrap().unwrap().columns[2].name, "Review");
    }

    #[test]
    fn test_load_missing_returns_none_and_delete_missing_fails() {
        let (_temp, storage) = setup_storage();
        assert!(storage.load_sprint(7).unwrap().is_none());
        assert!(storage.delete_sprint(7).is_err());
    }

    #[test]
    fn test_save_work_items_rejects_unknown_without_writing() {
        let (_temp, storage) = setup_storage();
        let mut a = storage
            .insert_work_item(WorkItem::new("A".to_string(), WorkItemType::Task, 1))
            .unwrap();
        let mut ghost = WorkItem::new("Ghost".to_string(), WorkItemType::Task, 1);
        ghost.id = 50;

        a.backlog_order = Some(900);
        assert!(storage.save_work_items(&[a.clone(), ghost]).is_err());
        assert_eq!(storage.load_work_item(a.id).unwrap().unwrap().backlog_order, None);

        storage.save_work_items(&[a.clone()]).unwrap();
        assert_eq!(storage.load_work_item(a.id).unwrap().unwrap().backlog_order, Some(900));
    }

    #[test]
    fn test_unknown_schema_version_rejected() {
        let (_temp, storage) = setup_storage();
        fs::write(
            storage.root.join(INDEX_FILE),
            r#"{"schema_version": 99, "counters": {"project":0,"board":0,"column":0,"sprint":0,"work_item":0}}"#,
        )
        .unwrap();

        let err = storage
            .insert_project(Project::new("X".to_string(), String::new(), 1))
            .unwrap_err();
        assert!(err.to_string().contains("schema version"));
    }

    #[test]
    fn test_write_blocked_while_lock_held() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::with_lock_timeout(temp_dir.path(), Duration::from_millis(50));
        storage.init().unwrap();

        let _held = FileLocker::new(Duration::from_millis(50))
            .lock_exclusive(&temp_dir.path().join(LOCK_FILE))
            .unwrap();

        let err = storage
            .insert_project(Project::new("Blocked".to_string(), String::new(), 1))
            .unwrap_err();
        assert!(err.to_string().contains("Lock timeout"));
    }
}
