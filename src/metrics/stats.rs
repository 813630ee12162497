//! Dashboard statistics
//!
//! Aggregates the per-task metrics into the `TaskStats` record that feeds
//! the dashboard charts and the insight synthesizer.

use chrono::{DateTime, Duration, DurationRound, NaiveDate, Utc};

use super::{
    average_completion_time, completion_rate, count_with_status, current_streak,
    high_priority_pending, pending_count, round_one_decimal,
};
use crate::models::{
    ActivityPeriod, BreakdownItem, DailyStat, Task, TaskPriority, TaskStats, TaskStatus,
};

const HOURS_PER_DAY_PERIOD: i64 = 24;
const DAYS_PER_WEEK_PERIOD: i64 = 7;
const DAYS_PER_MONTH_PERIOD: i64 = 30;

pub fn compute_stats(tasks: &[Task], now: DateTime<Utc>, period: ActivityPeriod) -> TaskStats {
    let completed = count_with_status(tasks, TaskStatus::Done);

    TaskStats {
        total_tasks: tasks.len(),
        completed_tasks: completed,
        pending_tasks: pending_count(tasks),
        high_priority_tasks: high_priority_pending(tasks).len(),
        completion_rate: completion_rate(tasks),
        daily_activity: daily_activity(tasks, now, period),
        priority_breakdown: priority_breakdown(tasks),
        status_breakdown: status_breakdown(tasks),
        avg_completion_time: average_completion_time(tasks),
        current_streak: current_streak(tasks, now.date_naive()),
    }
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>, period: ActivityPeriod) -> Self {
        compute_stats(tasks, now, period)
    }
}

pub fn priority_breakdown(tasks: &[Task]) -> Vec<BreakdownItem> {
    let count = |priority| tasks.iter().filter(|t| t.priority == priority).count();

    vec![
        BreakdownItem {
            label: "Low".to_string(),
            value: count(TaskPriority::Low),
        },
        BreakdownItem {
            label: "Medium".to_string(),
            value: count(TaskPriority::Medium),
        },
        BreakdownItem {
            label: "High".to_string(),
            value: count(TaskPriority::High),
        },
    ]
}

pub fn status_breakdown(tasks: &[Task]) -> Vec<BreakdownItem> {
    vec![
        BreakdownItem {
            label: "To Do".to_string(),
            value: count_with_status(tasks, TaskStatus::Todo),
        },
        BreakdownItem {
            label: "In Progress".to_string(),
            value: count_with_status(tasks, TaskStatus::InProgress),
        },
        BreakdownItem {
            label: "Done".to_string(),
            value: count_with_status(tasks, TaskStatus::Done),
        },
    ]
}

/// Task creation activity bucketed over the requested period, oldest bucket
/// first.
pub fn daily_activity(
    tasks: &[Task],
    now: DateTime<Utc>,
    period: ActivityPeriod,
) -> Vec<DailyStat> {
    match period {
        ActivityPeriod::Day => {
            let current_hour = now.duration_trunc(Duration::hours(1)).unwrap_or(now);

            (0..HOURS_PER_DAY_PERIOD)
                .map(|i| {
                    let start = current_hour - Duration::hours(HOURS_PER_DAY_PERIOD - 1 - i);
                    let end = start + Duration::hours(1);
                    let label = start.format("%I%p").to_string();
                    bucket(
                        tasks,
                        label.trim_start_matches('0').to_string(),
                        |t| t.created_at >= start && t.created_at < end,
                    )
                })
                .collect()
        }
        ActivityPeriod::Week => days_bucketed(tasks, now.date_naive(), DAYS_PER_WEEK_PERIOD, "%a"),
        ActivityPeriod::Month => {
            days_bucketed(tasks, now.date_naive(), DAYS_PER_MONTH_PERIOD, "%b %d")
        }
    }
}

fn days_bucketed(
    tasks: &[Task],
    today: NaiveDate,
    days: i64,
    label_format: &str,
) -> Vec<DailyStat> {
    let start = today - Duration::days(days - 1);

    (0..days)
        .map(|i| {
            let date = start + Duration::days(i);
            bucket(tasks, date.format(label_format).to_string(), |t| {
                t.created_at.date_naive() == date
            })
        })
        .collect()
}

fn bucket(tasks: &[Task], label: String, in_bucket: impl Fn(&Task) -> bool) -> DailyStat {
    let (count, hours) = tasks
        .iter()
        .filter(|t| in_bucket(t))
        .fold((0, 0.0), |(count, hours), t| {
            let logged = t.time_spent.filter(|h| h.is_finite() && *h > 0.0).unwrap_or(0.0);
            (count + 1, hours + logged)
        });

    DailyStat {
        date: label,
        count,
        hours: round_one_decimal(hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{now, task};

    #[test]
    fn test_compute_stats_counts() {
        let mut done = task(1, TaskStatus::Done, TaskPriority::High);
        done.time_spent = Some(3.0);
        let tasks = vec![
            done,
            task(2, TaskStatus::Todo, TaskPriority::High),
            task(3, TaskStatus::InProgress, TaskPriority::Low),
            task(4, TaskStatus::Todo, TaskPriority::Medium),
        ];

        let stats = compute_stats(&tasks, now(), ActivityPeriod::Week);
        assert_eq!(stats.total_tasks, 4);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.pending_tasks, 3);
        assert_eq!(stats.high_priority_tasks, 1);
        assert_eq!(stats.completion_rate, 25.0);
        assert_eq!(stats.avg_completion_time, 3.0);
        assert_eq!(stats.priority_breakdown[2].value, 2);
        assert_eq!(stats.status_breakdown[0].value, 2);
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&[], now(), ActivityPeriod::Week);
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.daily_activity.len(), 7);
    }

    #[test]
    fn test_week_activity_buckets() {
        let mut today = task(1, TaskStatus::Todo, TaskPriority::Low);
        today.created_at = now();
        today.time_spent = Some(1.25);
        let yesterday = task(2, TaskStatus::Todo, TaskPriority::Low);

        let activity = daily_activity(&[today, yesterday], now(), ActivityPeriod::Week);
        assert_eq!(activity.len(), 7);
        // 2025-06-10 is a Tuesday
        assert_eq!(activity[6].date, "Tue");
        assert_eq!(activity[6].count, 1);
        assert_eq!(activity[6].hours, 1.3);
        assert_eq!(activity[5].count, 1);
        assert_eq!(activity[0].count, 0);
    }

    #[test]
    fn test_day_and_month_labels() {
        let day = daily_activity(&[], now(), ActivityPeriod::Day);
        assert_eq!(day.len(), 24);
        assert_eq!(day[23].date, "12PM");
        assert_eq!(day[22].date, "11AM");

        let month = daily_activity(&[], now(), ActivityPeriod::Month);
        assert_eq!(month.len(), 30);
        assert_eq!(month[29].date, "Jun 10");
    }
}
