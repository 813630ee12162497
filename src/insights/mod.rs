//! Insight synthesizer for the dashboard
//!
//! Rules are evaluated independently against aggregate stats. Registration
//! order is the priority order; the result is capped after generation.

use tracing::debug;

use crate::models::{Insight, InsightKind, InsightTopic, TaskStats};

/// Dashboard shows at most this many cards
pub const MAX_INSIGHTS: usize = 4;

/// Trait for insight rules
pub trait InsightRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, stats: &TaskStats) -> Option<Insight>;
}

pub struct InsightSynthesizer {
    rules: Vec<Box<dyn InsightRule>>,
    max_insights: usize,
}

impl InsightSynthesizer {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            max_insights: MAX_INSIGHTS,
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Cards in rule order, truncated to the cap. Never sorted by severity.
    pub fn synthesize(&self, stats: &TaskStats) -> Vec<Insight> {
        let mut insights: Vec<Insight> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(stats))
            .collect();

        let generated = insights.len();
        insights.truncate(self.max_insights);

        debug!(
            rule_count = self.rules.len(),
            generated,
            returned = insights.len(),
            "Insights synthesized"
        );

        insights
    }
}

impl Default for InsightSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn insight(
    topic: InsightTopic,
    kind: InsightKind,
    title: impl Into<String>,
    description: impl Into<String>,
) -> Insight {
    Insight {
        topic,
        kind,
        title: title.into(),
        description: description.into(),
    }
}

//
// ========== Insight Rules ==========
//

/// Always produces one card describing the completion rate
pub struct ProductivityRule;

impl InsightRule for ProductivityRule {
    fn name(&self) -> &'static str {
        "productivity"
    }

    fn evaluate(&self, stats: &TaskStats) -> Option<Insight> {
        let rate = stats.completion_rate;
        let rounded = rate.round();

        let card = if rate >= 75.0 {
            insight(
                InsightTopic::Productivity,
                InsightKind::Success,
                "Outstanding Productivity",
                format!(
                    "You've completed {}% of your tasks — keep this momentum going!",
                    rounded
                ),
            )
        } else if rate >= 40.0 {
            insight(
                InsightTopic::Productivity,
                InsightKind::Info,
                "Good Progress",
                format!(
                    "{}% completion rate. Try batching similar tasks to boost efficiency.",
                    rounded
                ),
            )
        } else if stats.total_tasks > 0 {
            insight(
                InsightTopic::Productivity,
                InsightKind::Warning,
                "Focus Recommendation",
                format!(
                    "Only {}% tasks completed. Consider using the 2-minute rule for quick wins.",
                    rounded
                ),
            )
        } else {
            insight(
                InsightTopic::Productivity,
                InsightKind::Warning,
                "Focus Recommendation",
                "Create your first task to start tracking productivity!",
            )
        };

        Some(card)
    }
}

pub struct HighPriorityRule;

impl InsightRule for HighPriorityRule {
    fn name(&self) -> &'static str {
        "high_priority"
    }

    fn evaluate(&self, stats: &TaskStats) -> Option<Insight> {
        let high = stats.high_priority_tasks;
        if high == 0 {
            return None;
        }

        Some(insight(
            InsightTopic::HighPriority,
            InsightKind::Danger,
            format!("{} High Priority Task{} Pending", high, if high > 1 { "s" } else { "" }),
            "AI suggests tackling high-priority items first using the Eisenhower Matrix approach.",
        ))
    }
}

pub struct StreakRule;

impl InsightRule for StreakRule {
    fn name(&self) -> &'static str {
        "streak"
    }

    fn evaluate(&self, stats: &TaskStats) -> Option<Insight> {
        if stats.current_streak >= 3 {
            Some(insight(
                InsightTopic::Streak,
                InsightKind::Success,
                format!("{}-Day Activity Streak!", stats.current_streak),
                "Consistency is the key to success. You're building a powerful habit.",
            ))
        } else if stats.current_streak == 0 && stats.total_tasks > 0 {
            Some(insight(
                InsightTopic::Streak,
                InsightKind::Info,
                "Start Your Streak",
                "No activity today yet. Complete a quick task to begin a new streak!",
            ))
        } else {
            None
        }
    }
}

pub struct WorkloadRule {
    pub threshold: usize,
}

impl InsightRule for WorkloadRule {
    fn name(&self) -> &'static str {
        "workload"
    }

    fn evaluate(&self, stats: &TaskStats) -> Option<Insight> {
        (stats.pending_tasks > self.threshold).then(|| {
            insight(
                InsightTopic::Workload,
                InsightKind::Warning,
                "Workload Alert",
                format!(
                    "You have {} pending tasks. Consider delegating or breaking them into sub-tasks.",
                    stats.pending_tasks
                ),
            )
        })
    }
}

pub struct TimeEfficiencyRule {
    /// Average hours per task at or below which the pace counts as efficient
    pub efficient_hours: f64,
}

impl InsightRule for TimeEfficiencyRule {
    fn name(&self) -> &'static str {
        "time_efficiency"
    }

    fn evaluate(&self, stats: &TaskStats) -> Option<Insight> {
        let avg = stats.avg_completion_time;
        if avg <= 0.0 || !avg.is_finite() {
            return None;
        }

        let card = if avg <= self.efficient_hours {
            insight(
                InsightTopic::TimeEfficiency,
                InsightKind::Success,
                "Time Efficiency",
                format!("Avg {}h per task — you're working efficiently!", avg),
            )
        } else {
            insight(
                InsightTopic::TimeEfficiency,
                InsightKind::Info,
                "Time Efficiency",
                format!("Avg {}h per task. Try using the Pomodoro technique to reduce time.", avg),
            )
        };

        Some(card)
    }
}

/// Create a synthesizer with the standard dashboard rules
pub fn create_default_synthesizer() -> InsightSynthesizer {
    let mut synthesizer = InsightSynthesizer::new();
    synthesizer.add_rule(Box::new(ProductivityRule));
    synthesizer.add_rule(Box::new(HighPriorityRule));
    synthesizer.add_rule(Box::new(StreakRule));
    synthesizer.add_rule(Box::new(WorkloadRule { threshold: 5 }));
    synthesizer.add_rule(Box::new(TimeEfficiencyRule {
        efficient_hours: 2.0,
    }));
    synthesizer
}

//
// ================= Tests =================
//

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: usize, rate: f64) -> TaskStats {
        TaskStats {
            total_tasks: total,
            completion_rate: rate,
            ..TaskStats::default()
        }
    }

    #[test]
    fn test_productivity_bands() {
        let rule = ProductivityRule;

        let card = rule.evaluate(&stats(4, 75.0)).unwrap();
        assert_eq!(card.kind, InsightKind::Success);
        assert!(card.description.contains("75%"));

        let card = rule.evaluate(&stats(4, 40.0)).unwrap();
        assert_eq!(card.kind, InsightKind::Info);

        let card = rule.evaluate(&stats(4, 10.0)).unwrap();
        assert_eq!(card.kind, InsightKind::Warning);
        assert!(card.description.contains("Only 10%"));

        let card = rule.evaluate(&stats(0, 0.0)).unwrap();
        assert_eq!(card.kind, InsightKind::Warning);
        assert!(card.description.contains("Create your first task"));
    }

    #[test]
    fn test_empty_stats_give_single_card() {
        let synthesizer = create_default_synthesizer();
        let insights = synthesizer.synthesize(&TaskStats::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].topic, InsightTopic::Productivity);
    }

    #[test]
    fn test_capped_at_four_in_rule_order() {
        let busy = TaskStats {
            total_tasks: 20,
            completed_tasks: 2,
            pending_tasks: 18,
            high_priority_tasks: 3,
            completion_rate: 10.0,
            avg_completion_time: 4.5,
            current_streak: 5,
            ..TaskStats::default()
        };

        let insights = create_default_synthesizer().synthesize(&busy);
        assert_eq!(insights.len(), MAX_INSIGHTS);

        let topics: Vec<InsightTopic> = insights.iter().map(|i| i.topic).collect();
        assert_eq!(
            topics,
            vec![
                InsightTopic::Productivity,
                InsightTopic::HighPriority,
                InsightTopic::Streak,
                InsightTopic::Workload,
            ]
        );
        assert_eq!(insights[1].title, "3 High Priority Tasks Pending");
        assert_eq!(insights[2].title, "5-Day Activity Streak!");
    }

    #[test]
    fn test_deterministic_without_duplicate_topics() {
        let input = TaskStats {
            total_tasks: 6,
            pending_tasks: 2,
            high_priority_tasks: 1,
            completion_rate: 66.7,
            avg_completion_time: 1.5,
            ..TaskStats::default()
        };
        let synthesizer = create_default_synthesizer();

        let first = synthesizer.synthesize(&input);
        let second = synthesizer.synthesize(&input);
        assert_eq!(first, second);

        let mut topics: Vec<InsightTopic> = first.iter().map(|i| i.topic).collect();
        topics.dedup();
        assert_eq!(topics.len(), first.len());
    }

    #[test]
    fn test_streak_nudge_and_time_efficiency() {
        let input = TaskStats {
            total_tasks: 2,
            completion_rate: 50.0,
            avg_completion_time: 1.5,
            ..TaskStats::default()
        };

        let insights = create_default_synthesizer().synthesize(&input);
        assert_eq!(insights[1].title, "Start Your Streak");
        assert_eq!(insights[1].kind, InsightKind::Info);
        assert_eq!(insights[2].kind, InsightKind::Success);
        assert!(insights[2].description.contains("Avg 1.5h per task"));

        let rule = TimeEfficiencyRule {
            efficient_hours: 2.0,
        };
        let slow = rule
            .evaluate(&TaskStats {
                avg_completion_time: 3.0,
                ..TaskStats::default()
            })
            .unwrap();
        assert_eq!(slow.kind, InsightKind::Info);
        assert!(slow.description.contains("Pomodoro"));
    }
}
