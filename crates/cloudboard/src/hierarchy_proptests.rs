//! Property-based tests for the hierarchy walk
//!
//! Random parent forests are generated by only ever pointing an item at an
//! item with a smaller id, which keeps the stored data acyclic.

use super::*;
use crate::domain::WorkItemType;
use proptest::prelude::*;

// Generator for acyclic forests: parents[i] is an index < i, or None
fn forest_strategy() -> impl Strategy<Value = Vec<WorkItem>> {
    prop::collection::vec(any::<Option<prop::sample::Index>>(), 1..12).prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(i, pick)| {
                let id = i as WorkItemId + 1;
                let mut item = WorkItem::new(format!("Item {}", id), WorkItemType::Bug, 1);
                item.id = id;
                item.parent_id = match (i, pick) {
                    (0, _) | (_, None) => None,
                    (_, Some(index)) => Some(index.index(i) as WorkItemId + 1),
                };
                item
            })
            .collect()
    })
}

proptest! {
    // Clearing a parent can never create a cycle.
    #[test]
    fn prop_removing_parent_always_ok(items in forest_strategy(), id in 1i64..20) {
        let graph = HierarchyGraph::new(&items);
        prop_assert!(graph.validate_no_cycle(id, None).is_ok());
    }

    // Self-parenting is always rejected.
    #[test]
    fn prop_self_parent_always_rejected(items in forest_strategy(), id in 1i64..20) {
        let graph = HierarchyGraph::new(&items);
        prop_assert_eq!(graph.validate_no_cycle(id, Some(id)), Err(ValidationError::SelfParent));
    }

    // Re-parenting fails exactly when the new parent sits in the item's subtree.
    #[test]
    fn prop_cycle_iff_target_is_descendant(
        items in forest_strategy(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let item_id = a.index(items.len()) as WorkItemId + 1;
        let parent_id = b.index(items.len()) as WorkItemId + 1;
        prop_assume!(item_id != parent_id);

        let graph = HierarchyGraph::new(&items);
        let in_subtree = graph.descendants(item_id).iter().any(|d| d.id == parent_id);
        let result = graph.validate_no_cycle(item_id, Some(parent_id));

        if in_subtree {
            prop_assert_eq!(result, Err(ValidationError::CircularReference));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    // The path to root always starts at a root and ends at the item.
    #[test]
    fn prop_path_to_root_is_consistent(items in forest_strategy(), a in any::<prop::sample::Index>()) {
        let id = a.index(items.len()) as WorkItemId + 1;
        let graph = HierarchyGraph::new(&items);
        let path = graph.path_to_root(id);

        prop_assert_eq!(path.len(), graph.depth(id) + 1);
        prop_assert_eq!(path.last().map(|i| i.id), Some(id));
        prop_assert!(path.first().map(|i| i.parent_id.is_none()).unwrap_or(false));
    }
}
