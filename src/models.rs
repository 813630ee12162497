//! Core data models for the task assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::AssistantError;
use crate::Result;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

//
// ================= Task =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, with = "flexible_datetime::option")]
    pub due_date: Option<DateTime<Utc>>,
    /// Accumulated hours logged against the task
    #[serde(default)]
    pub time_spent: Option<f64>,
    #[serde(with = "flexible_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub owner_id: i64,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Reject records the analytics layer cannot reason about.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AssistantError::MalformedTask {
                id: self.id,
                reason: "empty title".to_string(),
            });
        }

        if let Some(hours) = self.time_spent {
            if !hours.is_finite() || hours < 0.0 {
                return Err(AssistantError::MalformedTask {
                    id: self.id,
                    reason: format!("invalid time_spent {}", hours),
                });
            }
        }

        Ok(())
    }
}

/// Parse a task collection record by record.
///
/// A record that fails to deserialize is skipped with a warning instead of
/// failing the whole collection.
pub fn parse_task_collection(value: serde_json::Value) -> Result<Vec<Task>> {
    let serde_json::Value::Array(items) = value else {
        return Err(AssistantError::TaskFetch(
            "expected a JSON array of tasks".to_string(),
        ));
    };

    let mut tasks = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Task>(item) {
            Ok(task) => tasks.push(task),
            Err(error) => {
                warn!(index, error = %error, "Skipping unreadable task record");
            }
        }
    }

    Ok(tasks)
}

/// Timestamps from the task API arrive either as RFC 3339 or as naive
/// ISO-8601 strings; naive values are read as UTC.
pub mod flexible_datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
            }
        }
    }
}

//
// ================= Chat =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotResponse {
    pub text: String,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Welcome {
    pub text: String,
    /// Something needs attention (overdue work or a pile of high-priority tasks)
    pub urgent: bool,
}

//
// ================= Insights =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InsightTopic {
    Productivity,
    HighPriority,
    Streak,
    Workload,
    TimeEfficiency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    pub topic: InsightTopic,
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
}

//
// ================= Analytics =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityPeriod {
    Day,
    #[default]
    Week,
    Month,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStat {
    pub date: String,
    pub count: usize,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakdownItem {
    pub label: String,
    pub value: usize,
}

/// Aggregate dashboard statistics for one user's task collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// High-priority tasks that are not done yet
    pub high_priority_tasks: usize,
    pub completion_rate: f64,
    pub daily_activity: Vec<DailyStat>,
    pub priority_breakdown: Vec<BreakdownItem>,
    pub status_breakdown: Vec<BreakdownItem>,
    pub avg_completion_time: f64,
    pub current_streak: u32,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Done => "done",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InsightKind::Success => "success",
            InsightKind::Info => "info",
            InsightKind::Warning => "warning",
            InsightKind::Danger => "danger",
        };
        write!(f, "{}", s)
    }
}
