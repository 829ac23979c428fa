//! CloudBoard Library
//!
//! Project boards whose work items form an Epic / Feature / PBI / Task
//! hierarchy (Bugs may hang under any container). The library validates
//! every hierarchy mutation, orders the project backlog, keeps board
//! columns and item statuses in sync, and runs sprints. It is used by the
//! HTTP server and can be embedded directly.

pub mod backlog;
pub mod board_columns;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod hierarchy;
pub mod storage;
pub mod type_hierarchy;
pub mod validation;

// Re-export commonly used types
pub use commands::CommandExecutor;
pub use config::CloudBoardConfig;
pub use domain::{Board, Project, Sprint, WorkItem, WorkItemType};
pub use errors::CloudBoardError;
pub use hierarchy::HierarchyGraph;
pub use storage::{BoardStore, InMemoryStorage, JsonFileStorage};
pub use validation::ValidationError;
