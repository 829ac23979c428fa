//! Parent/child hierarchy traversal and cycle detection.
//!
//! `HierarchyGraph` is an id-indexed view over work items that have already
//! been materialized from the store. Parent links are followed by id lookup;
//! nothing holds object references to parents or children.

use crate::domain::{WorkItem, WorkItemId};
use crate::validation::ValidationError;
use std::collections::{HashMap, HashSet};

/// Id-indexed view over a set of work items
///
/// All methods are pure; the graph never mutates the items it indexes.
pub struct HierarchyGraph<'a> {
    nodes: HashMap<WorkItemId, &'a WorkItem>,
}

impl<'a> HierarchyGraph<'a> {
    /// Create a hierarchy graph from a list of items
    pub fn new(items: &'a [WorkItem]) -> Self {
        let nodes = items.iter().map(|item| (item.id, item)).collect();
        Self { nodes }
    }

    pub fn get(&self, id: WorkItemId) -> Option<&'a WorkItem> {
        self.nodes.get(&id).copied()
    }

    pub fn contains(&self, id: WorkItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn parent_id(&self, id: WorkItemId) -> Option<WorkItemId> {
        self.nodes.get(&id).and_then(|item| item.parent_id)
    }

    /// Validate that giving `item_id` the parent `new_parent_id` keeps the hierarchy acyclic.
    ///
    /// Walks upward from the candidate parent, following parent ids, with a
    /// visited set seeded with `item_id`. Reaching an item with no parent (or
    /// a parent outside this graph) ends the walk successfully.
    pub fn validate_no_cycle(
        &self,
        item_id: WorkItemId,
        new_parent_id: Option<WorkItemId>,
    ) -> Result<(), ValidationError> {
        let Some(new_parent_id) = new_parent_id else {
            return Ok(());
        };

        if new_parent_id == item_id {
            return Err(ValidationError::SelfParent);
        }

        if !self.contains(item_id) {
            return Err(ValidationError::ItemNotFound(item_id));
        }

        let mut visited = HashSet::from([item_id]);
        let mut current = Some(new_parent_id);

        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(ValidationError::CircularReference);
            }
            current = self.parent_id(id);
        }

        Ok(())
    }

    /// Direct children of the given item
    pub fn children(&self, id: WorkItemId) -> Vec<&'a WorkItem> {
        let mut children: Vec<_> = self
            .nodes
            .values()
            .filter(|item| item.parent_id == Some(id))
            .copied()
            .collect();
        children.sort_by_key(|item| item.id);
        children
    }

    /// Ancestors from the direct parent up to the root
    pub fn ancestors(&self, id: WorkItemId) -> Vec<&'a WorkItem> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = self.parent_id(id);

        while let Some(parent_id) = current {
            // Stored data is not guaranteed acyclic; stop on repetition.
            if !visited.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            ancestors.push(parent);
            current = parent.parent_id;
        }

        ancestors
    }

    /// Root first, the item itself last. Empty if the item is unknown.
    pub fn path_to_root(&self, id: WorkItemId) -> Vec<&'a WorkItem> {
        let Some(item) = self.get(id) else {
            return Vec::new();
        };
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(item);
        path
    }

    /// Titles along the path to root joined by `separator`
    pub fn breadcrumb(&self, id: WorkItemId, separator: &str) -> String {
        self.path_to_root(id)
            .iter()
            .map(|item| item.title.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Number of ancestors (0 for a top-level item)
    pub fn depth(&self, id: WorkItemId) -> usize {
        self.ancestors(id).len()
    }

    /// Returns true if `ancestor_id` appears on the parent chain of `id`
    pub fn is_ancestor_of(&self, ancestor_id: WorkItemId, id: WorkItemId) -> bool {
        self.ancestors(id).iter().any(|a| a.id == ancestor_id)
    }

    /// All transitive children, depth-first
    pub fn descendants(&self, id: WorkItemId) -> Vec<&'a WorkItem> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            for child in self.children(current).into_iter().rev() {
                if visited.insert(child.id) {
                    result.push(child);
                    stack.push(child.id);
                }
            }
        }

        result
    }

    /// Items without a parent inside this graph
    pub fn roots(&self) -> Vec<&'a WorkItem> {
        let mut roots: Vec<_> = self
            .nodes
            .values()
            .filter(|item| match item.parent_id {
                None => true,
                Some(parent_id) => !self.contains(parent_id),
            })
            .copied()
            .collect();
        roots.sort_by_key(|item| (item.item_type, item.id));
        roots
    }

    /// Own estimate plus the estimates of the whole subtree.
    ///
    /// A leaf reports its own (possibly absent) estimate.
    pub fn total_estimated_hours(&self, id: WorkItemId) -> Option<f64> {
        self.rollup(id, |item| item.estimated_hours)
    }

    /// Own actual hours plus those of the whole subtree.
    pub fn total_actual_hours(&self, id: WorkItemId) -> Option<f64> {
        self.rollup(id, |item| item.actual_hours)
    }

    fn rollup(&self, id: WorkItemId, value: impl Fn(&WorkItem) -> Option<f64>) -> Option<f64> {
        let item = self.get(id)?;
        let descendants = self.descendants(id);
        if descendants.is_empty() {
            return value(item);
        }
        let subtree: f64 = descendants.iter().filter_map(|d| value(d)).sum();
        Some(value(item).unwrap_or(0.0) + subtree)
    }

    /// Share of direct children that are done, in percent.
    ///
    /// A childless item is 100 when its own status is done and 0 otherwise.
    pub fn completion_percentage(&self, id: WorkItemId) -> f64 {
        let Some(item) = self.get(id) else {
            return 0.0;
        };
        let children = self.children(id);
        if children.is_empty() {
            return if item.is_done() { 100.0 } else { 0.0 };
        }
        let done = children.iter().filter(|c| c.is_done()).count();
        done as f64 / children.len() as f64 * 100.0
    }
}


// Include property-based tests
#[cfg(test)]
#[path = "hierarchy_proptests.rs"]
mod proptests;
