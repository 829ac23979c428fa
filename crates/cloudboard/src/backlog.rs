//! Backlog ordering.
//!
//! Backlog items carry a `backlog_order` that is only meaningful relative to
//! the other items of the same project and parent. Values grow by a fixed
//! step and are never renormalized, so gaps are expected.

use crate::domain::{WorkItem, WorkItemId};
use serde::Deserialize;
use std::collections::HashSet;

/// Order for a new backlog item given the current maximum in its scope.
///
/// Returns `None` when the next order would overflow `i64`.
///
/// # Examples
///
/// ```
/// use cloudboard::backlog::next_backlog_order;
///
/// assert_eq!(next_backlog_order(None, 100), Some(0));
/// assert_eq!(next_backlog_order(Some(300), 100), Some(400));
/// assert_eq!(next_backlog_order(Some(i64::MAX), 100), None);
/// ```
pub fn next_backlog_order(max: Option<i64>, step: i64) -> Option<i64> {
    match max {
        None => Some(0),
        Some(max) => max.checked_add(step),
    }
}

/// One entry of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogPosition {
    pub item_id: WorkItemId,
    pub order: i64,
}

/// Ids that appear more than once in a reorder request, in request order.
pub fn duplicate_ids(positions: &[BacklogPosition]) -> Vec<WorkItemId> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for position in positions {
        if !seen.insert(position.item_id) && !duplicates.contains(&position.item_id) {
            duplicates.push(position.item_id);
        }
    }
    duplicates
}

/// Sorts backlog items by order (items without one last), then by id.
pub fn sort_backlog(items: &mut [WorkItem]) {
    items.sort_by_key(|item| (item.backlog_order.is_none(), item.backlog_order, item.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkItemType;

    #[test]
    fn test_first_item_gets_zero_then_steps() {
        let mut max = None;
        let mut assigned = Vec::new();
        for _ in 0..3 {
            let order = next_backlog_order(max, 100).unwrap();
            assigned.push(order);
            max = Some(order);
        }
        assert_eq!(assigned, vec![0, 100, 200]);
    }

    #[test]
    fn test_step_applies_to_sparse_maximum() {
        assert_eq!(next_backlog_order(Some(1_005), 100), Some(1_105));
        assert_eq!(next_backlog_order(Some(-50), 10), Some(-40));
    }

    #[test]
    fn test_order_overflow_is_reported() {
        assert_eq!(next_backlog_order(Some(i64::MAX - 50), 100), None);
        assert_eq!(next_backlog_order(Some(i64::MAX - 100), 100), Some(i64::MAX));
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let positions = [
            BacklogPosition { item_id: 1, order: 0 },
            BacklogPosition { item_id: 2, order: 1 },
            BacklogPosition { item_id: 1, order: 2 },
            BacklogPosition { item_id: 1, order: 3 },
        ];
        assert_eq!(duplicate_ids(&positions), vec![1]);
    }

    #[test]
    fn test_sort_backlog_puts_unordered_last() {
        let mut items: Vec<WorkItem> = [(1, None), (2, Some(200)), (3, Some(0)), (4, Some(200))]
            .into_iter()
            .map(|(id, order)| {
                let mut item = WorkItem::new(format!("#{}", id), WorkItemType::Task, 1);
                item.id = id;
                item.backlog_order = order;
                item
            })
            .collect();

        sort_backlog(&mut items);
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }
}
