//! Task metrics
//!
//! Pure derivations over a task collection. Every function that depends on
//! the current time takes it as an explicit `now` so identical inputs always
//! yield identical facts.

pub mod stats;

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::models::{Task, TaskPriority, TaskStatus};

pub use stats::compute_stats;

const MS_PER_DAY: i64 = 86_400_000;

pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Drop records that fail validation, logging each one.
pub fn sanitize(tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| match task.validate() {
            Ok(()) => true,
            Err(error) => {
                warn!(task_id = task.id, error = %error, "Excluding malformed task");
                false
            }
        })
        .cloned()
        .collect()
}

pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.is_done() && task.due_date.is_some_and(|due| due < now)
}

/// Unfinished tasks due strictly before `now`, most overdue first.
pub fn overdue(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    let mut overdue: Vec<&Task> = tasks.iter().filter(|t| is_overdue(t, now)).collect();
    overdue.sort_by_key(|t| t.due_date);
    overdue
}

/// Whole days until `due`, rounded up.
///
/// Anything due later today (or earlier today, less than a full day ago)
/// is day 0.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (due - now).num_milliseconds();
    if ms > 0 {
        (ms + MS_PER_DAY - 1) / MS_PER_DAY
    } else {
        // integer division truncates toward zero, which is the ceiling here
        ms / MS_PER_DAY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueLabel {
    Today,
    Tomorrow,
    InDays(i64),
}

impl DueLabel {
    pub fn from_days(days: i64) -> Self {
        match days {
            0 => DueLabel::Today,
            1 => DueLabel::Tomorrow,
            n => DueLabel::InDays(n),
        }
    }
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueLabel::Today => write!(f, "🔴 TODAY"),
            DueLabel::Tomorrow => write!(f, "🟠 Tomorrow"),
            DueLabel::InDays(n) => write!(f, "🟡 {} days", n),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UpcomingTask<'a> {
    pub task: &'a Task,
    pub days_left: i64,
    pub label: DueLabel,
}

/// Unfinished tasks due within `window_days`, soonest first.
pub fn upcoming(tasks: &[Task], now: DateTime<Utc>, window_days: i64) -> Vec<UpcomingTask<'_>> {
    let mut upcoming: Vec<UpcomingTask<'_>> = tasks
        .iter()
        .filter(|t| !t.is_done())
        .filter_map(|task| {
            let due = task.due_date?;
            let days_left = days_until(due, now);
            (0..=window_days).contains(&days_left).then_some(UpcomingTask {
                task,
                days_left,
                label: DueLabel::from_days(days_left),
            })
        })
        .collect();

    upcoming.sort_by_key(|u| u.task.due_date);
    upcoming
}

pub fn high_priority_pending(tasks: &[Task]) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.priority == TaskPriority::High && !t.is_done())
        .collect()
}

pub fn in_progress(tasks: &[Task]) -> Vec<&Task> {
    with_status(tasks, TaskStatus::InProgress)
}

pub fn with_status(tasks: &[Task], status: TaskStatus) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

pub fn count_with_status(tasks: &[Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

pub fn pending_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| !t.is_done()).count()
}

/// Newest first, truncated to `limit`.
pub fn recent(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Percentage of done tasks, 0 for an empty collection.
pub fn completion_rate(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let done = count_with_status(tasks, TaskStatus::Done);
    done as f64 / tasks.len() as f64 * 100.0
}

/// What to work on next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recommendation<'a> {
    Overdue(&'a Task),
    HighPriority(&'a Task),
    FinishInProgress(&'a Task),
    StartTodo(&'a Task),
    AllClear,
}

impl<'a> Recommendation<'a> {
    pub fn task(&self) -> Option<&'a Task> {
        match *self {
            Recommendation::Overdue(t)
            | Recommendation::HighPriority(t)
            | Recommendation::FinishInProgress(t)
            | Recommendation::StartTodo(t) => Some(t),
            Recommendation::AllClear => None,
        }
    }
}

/// Fixed precedence: overdue, high-priority todo, in progress, todo.
pub fn recommendation(tasks: &[Task], now: DateTime<Utc>) -> Recommendation<'_> {
    if let Some(task) = overdue(tasks, now).first() {
        return Recommendation::Overdue(task);
    }

    if let Some(task) = tasks
        .iter()
        .find(|t| t.priority == TaskPriority::High && t.status == TaskStatus::Todo)
    {
        return Recommendation::HighPriority(task);
    }

    if let Some(task) = tasks.iter().find(|t| t.status == TaskStatus::InProgress) {
        return Recommendation::FinishInProgress(task);
    }

    if let Some(task) = tasks.iter().find(|t| t.status == TaskStatus::Todo) {
        return Recommendation::StartTodo(task);
    }

    Recommendation::AllClear
}

/// Consecutive days ending at `today` on which at least one task was created.
pub fn current_streak(tasks: &[Task], today: NaiveDate) -> u32 {
    let active_days: HashSet<NaiveDate> =
        tasks.iter().map(|t| t.created_at.date_naive()).collect();

    let mut streak = 0;
    let mut day = Some(today);

    while let Some(current) = day {
        if !active_days.contains(&current) {
            break;
        }
        streak += 1;
        day = current.pred_opt();
    }

    streak
}

/// Mean hours logged on finished tasks, one decimal. Tasks with no (or
/// non-positive) logged time are ignored.
pub fn average_completion_time(tasks: &[Task]) -> f64 {
    let hours: Vec<f64> = tasks
        .iter()
        .filter(|t| t.is_done())
        .filter_map(|t| t.time_spent)
        .filter(|h| h.is_finite() && *h > 0.0)
        .collect();

    if hours.is_empty() {
        return 0.0;
    }

    round_one_decimal(hours.iter().sum::<f64>() / hours.len() as f64)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Short relative age such as `5m ago`.
pub fn time_ago(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mins = (now - instant).num_minutes();
    if mins < 1 {
        return "just now".to_string();
    }
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    let hrs = mins / 60;
    if hrs < 24 {
        return format!("{}h ago", hrs);
    }
    format!("{}d ago", hrs / 24)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    pub fn task(id: i64, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id,
            title: format!("Task {}", id),
            description: None,
            status,
            priority,
            due_date: None,
            time_spent: None,
            created_at: now() - Duration::days(1),
            owner_id: 1,
        }
    }

    pub fn due_in(mut task: Task, offset: Duration) -> Task {
        task.due_date = Some(now() + offset);
        task
    }
}
