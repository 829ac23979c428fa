//! Work item validation rules.
//!
//! Pure decision functions consulted by the command layer before any
//! hierarchy mutation is committed:
//!
//! - [`crate::type_hierarchy::validate_parent_child`]: type legality of a pair
//! - [`crate::hierarchy::HierarchyGraph::validate_no_cycle`]: re-parenting walk
//! - [`validate_delete`]: only childless items may be deleted
//! - [`validate_type_change`]: a new type must fit both the parent and the children
//!
//! Failures are reported as [`ValidationError`]; soft findings that do not
//! block the operation are collected in a [`ValidationReport`].

use crate::domain::{LoadedWorkItem, WorkItemId, WorkItemType};
use crate::type_hierarchy::{format_type_list, validate_parent_child};
use thiserror::Error;

/// Reasons a hierarchy mutation is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "A {} cannot have a {} as a child. Allowed children: {allowed}",
        .parent.display_name(),
        .child.display_name()
    )]
    IllegalChild {
        parent: WorkItemType,
        child: WorkItemType,
        allowed: String,
    },

    #[error("An item cannot be its own parent")]
    SelfParent,

    #[error("This would create a circular reference in the hierarchy")]
    CircularReference,

    #[error("Item {0} not found")]
    ItemNotFound(WorkItemId),

    #[error(
        "Cannot delete '{title}' because it has {child_count} child items. \
         Delete or reassign the children first."
    )]
    HasChildren { title: String, child_count: usize },

    #[error(
        "Cannot change type to {} because it has incompatible children: {child_types}",
        .new_type.display_name()
    )]
    IncompatibleChildren {
        new_type: WorkItemType,
        child_types: String,
    },
}

/// Outcome of a validation that passed, possibly with warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validates that a work item may be deleted.
///
/// Only direct children gate deletion.
pub fn validate_delete(item: &LoadedWorkItem) -> Result<(), ValidationError> {
    if item.has_children() {
        return Err(ValidationError::HasChildren {
            title: item.item.title.clone(),
            child_count: item.children.len(),
        });
    }
    Ok(())
}

/// Validates changing a work item's type to `new_type`.
///
/// Checks the loaded parent first and short-circuits on failure; then every
/// loaded child must be allowed under `new_type`. When children exist and
/// all fit, the change passes with a warning naming how many are affected.
pub fn validate_type_change(
    item: &LoadedWorkItem,
    new_type: WorkItemType,
) -> Result<ValidationReport, ValidationError> {
    if let Some(parent) = &item.parent {
        validate_parent_child(parent.item_type, new_type)?;
    }

    let report = ValidationReport::default();
    if !item.has_children() {
        return Ok(report);
    }

    let incompatible: Vec<WorkItemType> = item
        .children
        .iter()
        .map(|c| c.item_type)
        .filter(|t| !new_type.can_have_child_type(*t))
        .collect();

    if !incompatible.is_empty() {
        return Err(ValidationError::IncompatibleChildren {
            new_type,
            child_types: format_type_list(&incompatible),
        });
    }

    Ok(report.with_warning(format!(
        "This change will affect {} child items",
        item.children.len()
    )))
}
