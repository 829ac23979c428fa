//! Board column rules: validation of column sets and the sync plan applied
//! when a board's columns are replaced.

use crate::domain::{
    BoardColumn, ColumnCategory, ColumnId, DEFAULT_STATUS, DONE_STATUS, IN_PROGRESS_STATUS,
};
use crate::errors::{CloudBoardError, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};

pub const MIN_COLUMNS: usize = 1;
pub const MAX_COLUMNS: usize = 5;
pub const MAX_COLUMN_NAME_LENGTH: usize = 50;

/// A column as supplied by a client. `id` is absent for new columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    #[serde(default)]
    pub id: Option<ColumnId>,
    pub name: String,
    pub order: i32,
    #[serde(default)]
    pub category: ColumnCategory,
}

/// "To Do", "In Progress", "Done"
pub fn default_columns() -> Vec<ColumnSpec> {
    [
        (DEFAULT_STATUS, ColumnCategory::Proposed),
        (IN_PROGRESS_STATUS, ColumnCategory::InProgress),
        (DONE_STATUS, ColumnCategory::Resolved),
    ]
    .into_iter()
    .enumerate()
    .map(|(order, (name, category))| ColumnSpec {
        id: None,
        name: name.to_string(),
        order: order as i32,
        category,
    })
    .collect()
}

/// Validates the columns of a new board.
///
/// Same as [`validate_columns_for_update`], and additionally the orders must
/// be exactly `0..n` once sorted.
pub fn validate_columns(columns: &[ColumnSpec]) -> Result<()> {
    validate_columns_for_update(columns)?;

    let mut orders: Vec<i32> = columns.iter().map(|c| c.order).collect();
    orders.sort_unstable();
    if orders.iter().enumerate().any(|(i, &order)| order != i as i32) {
        return Err(CloudBoardError::invalid(
            "Column orders must be sequential starting from 0",
        ));
    }

    Ok(())
}

/// Validates a replacement column set for an existing board.
pub fn validate_columns_for_update(columns: &[ColumnSpec]) -> Result<()> {
    if columns.len() < MIN_COLUMNS || columns.len() > MAX_COLUMNS {
        return Err(CloudBoardError::invalid(format!(
            "Board must have between {} and {} columns",
            MIN_COLUMNS, MAX_COLUMNS
        )));
    }

    for column in columns {
        let name = column.name.trim();
        if name.is_empty() {
            return Err(CloudBoardError::invalid("Column name cannot be empty"));
        }
        if name.chars().count() > MAX_COLUMN_NAME_LENGTH {
            return Err(CloudBoardError::invalid(format!(
                "Column name '{}' exceeds {} characters",
                name, MAX_COLUMN_NAME_LENGTH
            )));
        }
    }

    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    for column in columns {
        let key = column.name.trim().to_lowercase();
        if !seen.insert(key.clone()) {
            duplicates.insert(key);
        }
    }
    if !duplicates.is_empty() {
        return Err(CloudBoardError::invalid(format!(
            "Duplicate column names found: {}",
            duplicates.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }

    Ok(())
}

/// Builds board columns from validated specs. New columns get id 0 and are
/// numbered by the store on save.
pub fn build_columns(specs: &[ColumnSpec]) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = specs
        .iter()
        .map(|spec| BoardColumn {
            id: spec.id.unwrap_or(0),
            name: spec.name.trim().to_string(),
            order: spec.order,
            category: spec.category,
        })
        .collect();
    columns.sort_by_key(|c| c.order);
    columns
}

/// Result of reconciling a board's current columns with a replacement set.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSync {
    /// The board's new columns, sorted by order
    pub columns: Vec<BoardColumn>,
    /// Old status name to new status name for items on the board
    pub status_changes: HashMap<String, String>,
}

impl ColumnSync {
    /// New status for an item currently in `status`, if it has to change.
    pub fn remap(&self, status: &str) -> Option<&str> {
        self.status_changes.get(status).map(String::as_str)
    }
}

/// Plans a column replacement.
///
/// Existing columns missing from `specs` are deleted and their items move to
/// the leftmost new column. Columns whose name changed carry their items
/// along. Specs without an id become new columns.
pub fn plan_column_sync(existing: &[BoardColumn], specs: &[ColumnSpec]) -> Result<ColumnSync> {
    let existing_by_id: HashMap<ColumnId, &BoardColumn> =
        existing.iter().map(|c| (c.id, c)).collect();

    if let Some(unknown) = specs
        .iter()
        .filter_map(|s| s.id)
        .find(|id| !existing_by_id.contains_key(id))
    {
        return Err(CloudBoardError::invalid(format!(
            "Column {} does not belong to this board",
            unknown
        )));
    }

    let columns = build_columns(specs);
    let leftmost = match columns.first() {
        Some(column) => column.name.clone(),
        None => {
            return Err(CloudBoardError::invalid(format!(
                "Board must have between {} and {} columns",
                MIN_COLUMNS, MAX_COLUMNS
            )))
        }
    };

    let mut status_changes = HashMap::new();
    for old in existing {
        match columns.iter().find(|c| c.id == old.id) {
            Some(kept) if kept.name != old.name => {
                status_changes.insert(old.name.clone(), kept.name.clone());
            }
            Some(_) => {}
            None => {
                // A deleted column whose name survives on a new column keeps its items.
                if !columns.iter().any(|c| c.name == old.name) {
                    status_changes.insert(old.name.clone(), leftmost.clone());
                }
            }
        }
    }

    Ok(ColumnSync {
        columns,
        status_changes,
    })
}
