//! Work item type hierarchy rules.
//!
//! The allowed-children table below is the single source of truth for which
//! work item type may parent which other type:
//!
//! | Parent  | Allowed children |
//! |---------|------------------|
//! | Epic    | Feature, Bug     |
//! | Feature | PBI, Bug         |
//! | PBI     | Task, Bug        |
//! | Task    | (none)           |
//! | Bug     | (none)           |
//!
//! Epic, Feature, PBI and Task have fixed levels 0 to 3. Bug has no fixed
//! level: it may hang under any container type but never has children.
//!
//! # Examples
//!
//! ```
//! use cloudboard::domain::WorkItemType;
//! use cloudboard::type_hierarchy::validate_parent_child;
//!
//! assert!(validate_parent_child(WorkItemType::Epic, WorkItemType::Feature).is_ok());
//! assert!(validate_parent_child(WorkItemType::Epic, WorkItemType::Task).is_err());
//! assert_eq!(WorkItemType::Pbi.hierarchy_level(), Some(2));
//! assert_eq!(WorkItemType::Bug.hierarchy_level(), None);
//! ```

use crate::domain::WorkItemType;
use crate::validation::ValidationError;
use serde::Serialize;

impl WorkItemType {
    /// Every type, from the top of the hierarchy down, Bug last.
    pub const ALL: [WorkItemType; 5] = [
        WorkItemType::Epic,
        WorkItemType::Feature,
        WorkItemType::Pbi,
        WorkItemType::Task,
        WorkItemType::Bug,
    ];

    /// Returns the types that may be direct children of this type.
    pub fn allowed_child_types(self) -> &'static [WorkItemType] {
        match self {
            WorkItemType::Epic => &[WorkItemType::Feature, WorkItemType::Bug],
            WorkItemType::Feature => &[WorkItemType::Pbi, WorkItemType::Bug],
            WorkItemType::Pbi => &[WorkItemType::Task, WorkItemType::Bug],
            WorkItemType::Task | WorkItemType::Bug => &[],
        }
    }

    /// Returns true if an item of type `child` may be a direct child of this type.
    pub fn can_have_child_type(self, child: WorkItemType) -> bool {
        self.allowed_child_types().contains(&child)
    }

    /// Returns true if this type may have any children at all.
    pub fn can_have_children(self) -> bool {
        !self.allowed_child_types().is_empty()
    }

    /// Fixed level in the hierarchy (0 = top), or `None` for Bug.
    pub fn hierarchy_level(self) -> Option<u8> {
        match self {
            WorkItemType::Epic => Some(0),
            WorkItemType::Feature => Some(1),
            WorkItemType::Pbi => Some(2),
            WorkItemType::Task => Some(3),
            WorkItemType::Bug => None,
        }
    }

    /// Leaf types can never have children.
    pub fn is_leaf(self) -> bool {
        !self.can_have_children()
    }

    /// Human-readable name used in validation messages.
    pub fn display_name(self) -> &'static str {
        match self {
            WorkItemType::Epic => "Epic",
            WorkItemType::Feature => "Feature",
            WorkItemType::Pbi => "Product Backlog Item",
            WorkItemType::Task => "Task",
            WorkItemType::Bug => "Bug",
        }
    }

    /// Icon identifier for UI rendering.
    pub fn icon_class(self) -> &'static str {
        match self {
            WorkItemType::Epic => "epic-icon",
            WorkItemType::Feature => "feature-icon",
            WorkItemType::Pbi => "pbi-icon",
            WorkItemType::Task => "task-icon",
            WorkItemType::Bug => "bug-icon",
        }
    }
}

/// Validates that an item of type `child` may be placed under an item of type `parent`.
///
/// # Errors
///
/// Returns [`ValidationError::IllegalChild`] naming both types and the
/// allowed alternatives when the pair is not in the allowed-children table.
pub fn validate_parent_child(
    parent: WorkItemType,
    child: WorkItemType,
) -> Result<(), ValidationError> {
    if parent.can_have_child_type(child) {
        return Ok(());
    }

    Err(ValidationError::IllegalChild {
        parent,
        child,
        allowed: format_type_list(parent.allowed_child_types()),
    })
}

/// Joins display names with ", ", or "none" for an empty list.
pub(crate) fn format_type_list(types: &[WorkItemType]) -> String {
    if types.is_empty() {
        return "none".to_string();
    }
    types
        .iter()
        .map(|t| t.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serializable description of one type's hierarchy rules, for API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRule {
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    pub level: Option<u8>,
    pub allowed_children: Vec<WorkItemType>,
    pub display_name: &'static str,
    pub icon_class: &'static str,
}

/// Returns the full hierarchy table, one entry per type.
pub fn type_rules() -> Vec<TypeRule> {
    WorkItemType::ALL
        .iter()
        .map(|&t| TypeRule {
            item_type: t,
            level: t.hierarchy_level(),
            allowed_children: t.allowed_child_types().to_vec(),
            display_name: t.display_name(),
            icon_class: t.icon_class(),
        })
        .collect()
}
