//! Backlog listing and reordering

use super::*;
use crate::backlog::{duplicate_ids, sort_backlog, BacklogPosition};
use std::collections::HashSet;

impl<S: BoardStore> CommandExecutor<S> {
    /// Project backlog ordered by backlog order, then id
    pub fn list_backlog(&self, user: UserId, project_id: ProjectId) -> Result<Vec<WorkItem>> {
        self.authorize_project(project_id, user)?;
        let mut items = self.storage.backlog(project_id)?;
        sort_backlog(&mut items);
        Ok(items)
    }

    /// Writes the given orders verbatim.
    ///
    /// Every id must be distinct and name an item in this project's backlog;
    /// otherwise nothing is written.
    pub fn reorder_backlog(
        &self,
        user: UserId,
        project_id: ProjectId,
        positions: Vec<BacklogPosition>,
    ) -> Result<Vec<WorkItem>> {
        let duplicates = duplicate_ids(&positions);
        if !duplicates.is_empty() {
            return Err(CloudBoardError::invalid(format!(
                "Duplicate work items in reorder request: {:?}",
                duplicates
            )));
        }

        let _guard = self.write_guard()?;
        self.authorize_project(project_id, user)?;

        let ids: Vec<WorkItemId> = positions.iter().map(|p| p.item_id).collect();
        let mut items = self.storage.backlog_items_by_ids(project_id, &ids)?;

        let found: HashSet<WorkItemId> = items.iter().map(|w| w.id).collect();
        let missing: Vec<WorkItemId> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            debug!(project_id, ?missing, "reorder rejected");
            return Err(CloudBoardError::invalid(format!(
                "Work items {:?} are not in the backlog of project {}",
                missing, project_id
            )));
        }

        for item in &mut items {
            item.backlog_order = positions
                .iter()
                .find(|p| p.item_id == item.id)
                .map(|p| p.order);
        }
        self.storage.save_work_items(&items)?;
        info!(project_id, count = items.len(), "reordered backlog");

        sort_backlog(&mut items);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::*;
    use super::*;
    use crate::domain::WorkItemType;

    fn position(item_id: WorkItemId, order: i64) -> BacklogPosition {
        BacklogPosition { item_id, order }
    }

    #[test]
    fn test_backlog_orders_step_by_hundred() {
        let executor = setup();
        let project = create_project(&executor);
        let orders: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|t| backlog_item(&executor, project.id, t, WorkItemType::Epic, None).backlog_order)
            .collect();
        assert_eq!(orders, vec![Some(0), Some(100), Some(200)]);
    }

    #[test]
    fn test_orders_scoped_by_parent() {
        let executor = setup();
        let project = create_project(&executor);
        let epic = backlog_item(&executor, project.id, "Epic", WorkItemType::Epic, None);
        let first = backlog_item(&executor, project.id, "F1", WorkItemType::Feature, Some(epic.id));
        let second = backlog_item(&executor, project.id, "F2", WorkItemType::Feature, Some(epic.id));
        let sibling = backlog_item(&executor, project.id, "Epic 2", WorkItemType::Epic, None);

        assert_eq!(first.backlog_order, Some(0));
        assert_eq!(second.backlog_order, Some(100));
        assert_eq!(sibling.backlog_order, Some(100));
    }

    #[test]
    fn test_reorder_writes_values_verbatim() {
        let executor = setup();
        let project = create_project(&executor);
        let a = backlog_item(&executor, project.id, "a", WorkItemType::Epic, None);
        let b = backlog_item(&executor, project.id, "b", WorkItemType::Epic, None);

        let reordered = executor
            .reorder_backlog(OWNER, project.id, vec![position(a.id, 7), position(b.id, 3)])
            .unwrap();
        let ids: Vec<_> = reordered.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let listed: Vec<_> = executor
            .list_backlog(OWNER, project.id)
            .unwrap()
            .into_iter()
            .map(|w| (w.id, w.backlog_order))
            .collect();
        assert_eq!(listed, vec![(b.id, Some(3)), (a.id, Some(7))]);
    }

    #[test]
    fn test_reorder_rejects_board_item_and_writes_nothing() {
        let executor = setup();
        let project = create_project(&executor);
        let board = default_board(&executor, project.id);
        let a = backlog_item(&executor, project.id, "a", WorkItemType::Epic, None);
        let placed = board_item(&executor, board.id, "p", WorkItemType::Task, None);

        let err = executor
            .reorder_backlog(OWNER, project.id, vec![position(a.id, 50), position(placed.id, 1)])
            .unwrap_err();
        assert!(matches!(err, CloudBoardError::InvalidOperation(_)));
        assert_eq!(executor.get_work_item(OWNER, a.id).unwrap().backlog_order, Some(0));
    }

    #[test]
    fn test_order_overflow_rejects_create_and_keeps_executor_usable() {
        let executor = setup();
        let project = create_project(&executor);
        let top = backlog_item(&executor, project.id, "top", WorkItemType::Epic, None);
        executor
            .reorder_backlog(OWNER, project.id, vec![position(top.id, i64::MAX - 10)])
            .unwrap();

        let err = executor
            .create_backlog_item(OWNER, project.id, NewWorkItem::new("next", WorkItemType::Epic))
            .unwrap_err();
        assert!(matches!(err, CloudBoardError::InvalidOperation(_)));
        assert!(err.to_string().contains("overflow"));

        // Other scopes and later mutations are unaffected
        let child = backlog_item(&executor, project.id, "child", WorkItemType::Feature, Some(top.id));
        assert_eq!(child.backlog_order, Some(0));
        assert!(executor
            .create_project(
                OWNER,
                NewProject {
                    name: "After".to_string(),
                    description: String::new(),
                },
            )
            .is_ok());
    }

    #[test]
    fn test_write_lock_recovers_after_panicking_holder() {
        let executor = std::sync::Arc::new(setup());
        let poisoner = std::sync::Arc::clone(&executor);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.write_guard().unwrap();
            panic!("holder panics");
        })
        .join();
        assert!(joined.is_err());

        let project = create_project(&executor);
        assert_eq!(
            backlog_item(&executor, project.id, "a", WorkItemType::Epic, None).backlog_order,
            Some(0)
        );
    }

    #[test]
    fn test_reorder_rejects_duplicates_and_strangers() {
        let executor = setup();
        let project = create_project(&executor);
        let a = backlog_item(&executor, project.id, "a", WorkItemType::Epic, None);

        assert!(matches!(
            executor.reorder_backlog(OWNER, project.id, vec![position(a.id, 1), position(a.id, 2)]),
            Err(CloudBoardError::InvalidOperation(_))
        ));
        assert!(matches!(
            executor.reorder_backlog(STRANGER, project.id, vec![position(a.id, 1)]),
            Err(CloudBoardError::Unauthorized(_))
        ));
    }
}
