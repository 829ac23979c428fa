//! Sprint lifecycle, statistics and burndown

use super::*;
use crate::domain::{SprintStatus, DEFAULT_STATUS, DONE_STATUS, IN_PROGRESS_STATUS};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSprint {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub goal: Option<String>,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintUpdate {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub goal: Option<String>,
}

/// A sprint with progress figures computed from its items
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintSummary {
    #[serde(flatten)]
    pub sprint: Sprint,
    pub total_work_items: usize,
    pub completed_work_items: usize,
    pub progress_percentage: f64,
    pub total_estimated_hours: f64,
    pub completed_estimated_hours: f64,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintCompletion {
    pub sprint: Sprint,
    /// Items that were not done and left the sprint
    pub moved_to_backlog: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintStats {
    pub total_items: usize,
    pub todo_count: usize,
    pub in_progress_count: usize,
    pub done_count: usize,
    pub total_estimated_hours: f64,
    pub completed_estimated_hours: f64,
    pub remaining_estimated_hours: f64,
}

impl SprintStats {
    fn from_items(items: &[WorkItem]) -> Self {
        let count = |status: &str| items.iter().filter(|w| w.status == status).count();
        let hours = |done: bool| -> f64 {
            items
                .iter()
                .filter(|w| w.is_done() == done)
                .filter_map(|w| w.estimated_hours)
                .sum()
        };
        let completed = hours(true);
        let remaining = hours(false);

        Self {
            total_items: items.len(),
            todo_count: count(DEFAULT_STATUS),
            in_progress_count: count(IN_PROGRESS_STATUS),
            done_count: count(DONE_STATUS),
            total_estimated_hours: completed + remaining,
            completed_estimated_hours: completed,
            remaining_estimated_hours: remaining,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurndownPoint {
    pub date: NaiveDate,
    pub remaining_hours: f64,
    pub ideal_remaining_hours: f64,
}

fn summarize(sprint: Sprint, items: &[WorkItem], today: NaiveDate) -> SprintSummary {
    let stats = SprintStats::from_items(items);
    let progress_percentage = if stats.total_items == 0 {
        0.0
    } else {
        stats.done_count as f64 / stats.total_items as f64 * 100.0
    };

    SprintSummary {
        days_remaining: (sprint.end_date.date_naive() - today).num_days(),
        sprint,
        total_work_items: stats.total_items,
        completed_work_items: stats.done_count,
        progress_percentage,
        total_estimated_hours: stats.total_estimated_hours,
        completed_estimated_hours: stats.completed_estimated_hours,
    }
}

/// Longest sprint accepted on create and update, in days
pub const MAX_SPRINT_DAYS: i64 = 365;

/// One point per day from the start date, `duration + 1` points in all.
///
/// The actual line has no history: days up to `today` show the current
/// remaining hours, later days show the full total.
fn burndown(sprint: &Sprint, stats: &SprintStats, today: NaiveDate) -> Result<Vec<BurndownPoint>> {
    let start = sprint.start_date.date_naive();
    let duration = (sprint.end_date.date_naive() - start).num_days() + 1;
    if duration > MAX_SPRINT_DAYS + 1 {
        return Err(CloudBoardError::invalid(format!(
            "Sprint {} spans {} days; burndown is limited to {} days",
            sprint.id, duration, MAX_SPRINT_DAYS
        )));
    }
    let total = stats.total_estimated_hours;
    let daily = if duration > 0 { total / duration as f64 } else { 0.0 };

    (0..=duration.max(0))
        .map(|day| {
            let date = start
                .checked_add_signed(Duration::days(day))
                .ok_or_else(|| CloudBoardError::invalid("Sprint dates are out of range"))?;
            Ok(BurndownPoint {
                date,
                remaining_hours: if date <= today {
                    total - stats.completed_estimated_hours
                } else {
                    total
                },
                ideal_remaining_hours: (total - day as f64 * daily).max(0.0),
            })
        })
        .collect()
}

fn validate_dates(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= start {
        return Err(CloudBoardError::invalid("End date must be after start date"));
    }
    if (end.date_naive() - start.date_naive()).num_days() > MAX_SPRINT_DAYS {
        return Err(CloudBoardError::invalid(format!(
            "Sprint cannot be longer than {} days",
            MAX_SPRINT_DAYS
        )));
    }
    Ok(())
}

fn validate_sprint_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CloudBoardError::invalid("Sprint name cannot be empty"));
    }
    Ok(name.to_string())
}

impl<S: BoardStore> CommandExecutor<S> {
    /// Creates a sprint in Planning status
    pub fn create_sprint(&self, user: UserId, board_id: BoardId, new: NewSprint) -> Result<Sprint> {
        let name = validate_sprint_name(&new.name)?;
        validate_dates(new.start_date, new.end_date)?;

        let _guard = self.write_guard()?;
        self.authorize_board(board_id, user)?;

        let sprint = self.storage.insert_sprint(Sprint {
            id: 0,
            board_id,
            name,
            start_date: new.start_date,
            end_date: new.end_date,
            goal: new.goal,
            status: SprintStatus::Planning,
            created_at: Utc::now(),
        })?;
        Self::log_created("sprint", sprint.id);
        Ok(sprint)
    }

    pub fn get_sprint(&self, user: UserId, id: SprintId, today: NaiveDate) -> Result<SprintSummary> {
        let (sprint, _) = self.authorize_sprint(id, user)?;
        let items = self.storage.work_items_in_sprint(id)?;
        Ok(summarize(sprint, &items, today))
    }

    /// Sprints of a board, newest start first
    pub fn list_sprints(&self, user: UserId, board_id: BoardId, today: NaiveDate) -> Result<Vec<SprintSummary>> {
        self.authorize_board(board_id, user)?;
        let mut sprints = self.storage.sprints_on_board(board_id)?;
        sprints.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));

        sprints
            .into_iter()
            .map(|sprint| -> Result<SprintSummary> {
                let items = self.storage.work_items_in_sprint(sprint.id)?;
                Ok(summarize(sprint, &items, today))
            })
            .collect()
    }

    pub fn update_sprint(&self, user: UserId, id: SprintId, update: SprintUpdate) -> Result<Sprint> {
        let _guard = self.write_guard()?;
        let (mut sprint, _) = self.authorize_sprint(id, user)?;

        if let Some(name) = update.name {
            sprint.name = validate_sprint_name(&name)?;
        }
        if let Some(start) = update.start_date {
            sprint.start_date = start;
        }
        if let Some(end) = update.end_date {
            sprint.end_date = end;
        }
        if update.goal.is_some() {
            sprint.goal = update.goal;
        }
        validate_dates(sprint.start_date, sprint.end_date)?;

        self.storage.save_sprint(&sprint)?;
        Ok(sprint)
    }

    /// Planning -> Active; at most one active sprint per board
    pub fn start_sprint(&self, user: UserId, id: SprintId) -> Result<Sprint> {
        let _guard = self.write_guard()?;
        let (mut sprint, board) = self.authorize_sprint(id, user)?;

        if sprint.status != SprintStatus::Planning {
            return Err(CloudBoardError::invalid(
                "Only sprints in Planning status can be started",
            ));
        }
        let active = self
            .storage
            .sprints_on_board(board.id)?
            .into_iter()
            .any(|s| s.id != id && s.status == SprintStatus::Active);
        if active {
            return Err(CloudBoardError::invalid(
                "Another sprint is already active. Complete it first.",
            ));
        }

        sprint.status = SprintStatus::Active;
        self.storage.save_sprint(&sprint)?;
        info!(sprint_id = id, board_id = board.id, "started sprint");
        Ok(sprint)
    }

    /// Active -> Completed. Items not done leave the sprint.
    pub fn complete_sprint(&self, user: UserId, id: SprintId) -> Result<SprintCompletion> {
        let _guard = self.write_guard()?;
        let (mut sprint, _) = self.authorize_sprint(id, user)?;

        if sprint.status != SprintStatus::Active {
            return Err(CloudBoardError::invalid("Only active sprints can be completed"));
        }

        let unfinished: Vec<WorkItem> = self
            .storage
            .work_items_in_sprint(id)?
            .into_iter()
            .filter(|w| !w.is_done())
            .map(|mut w| {
                w.sprint_id = None;
                w
            })
            .collect();
        if !unfinished.is_empty() {
            self.storage.save_work_items(&unfinished)?;
        }

        sprint.status = SprintStatus::Completed;
        self.storage.save_sprint(&sprint)?;
        info!(sprint_id = id, moved = unfinished.len(), "completed sprint");

        Ok(SprintCompletion {
            sprint,
            moved_to_backlog: unfinished.len(),
        })
    }

    /// Deletes the sprint; its items stay on the board without a sprint
    pub fn delete_sprint(&self, user: UserId, id: SprintId) -> Result<()> {
        let _guard = self.write_guard()?;
        self.authorize_sprint(id, user)?;

        let released: Vec<WorkItem> = self
            .storage
            .work_items_in_sprint(id)?
            .into_iter()
            .map(|mut w| {
                w.sprint_id = None;
                w
            })
            .collect();
        if !released.is_empty() {
            self.storage.save_work_items(&released)?;
        }
        self.storage.delete_sprint(id)?;

        Self::log_deleted("sprint", id);
        Ok(())
    }

    pub fn sprint_stats(&self, user: UserId, id: SprintId) -> Result<SprintStats> {
        self.authorize_sprint(id, user)?;
        let items = self.storage.work_items_in_sprint(id)?;
        Ok(SprintStats::from_items(&items))
    }

    pub fn sprint_burndown(&self, user: UserId, id: SprintId, today: NaiveDate) -> Result<Vec<BurndownPoint>> {
        let (sprint, _) = self.authorize_sprint(id, user)?;
        let items = self.storage.work_items_in_sprint(id)?;
        burndown(&sprint, &SprintStats::from_items(&items), today)
    }
}
