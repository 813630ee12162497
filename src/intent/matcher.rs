//! Intent matcher
//!
//! Scores an utterance against the rule table and turns the winning rule
//! into a reply. Randomness (typing delay, fallback pick) comes from the
//! caller's RNG so it can be pinned.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::replies;
use super::rules::{ReplyContext, RuleTable};
use crate::config::AssistantConfig;
use crate::metrics::{self, DEFAULT_RECENT_LIMIT, DEFAULT_UPCOMING_WINDOW_DAYS};
use crate::models::{BotResponse, Task, Welcome};

pub const EMPTY_PROMPT: &str = "Type a message! Try **\"my tasks\"** or **\"help\"** to get started. 😊";
pub const EMPTY_PROMPT_DELAY_MS: u64 = 400;

pub const FALLBACK_DELAY_MS: u64 = 700;
pub const FALLBACKS: [&str; 3] = [
    "I didn't catch that! Try asking about your **tasks**, **deadlines**, **priorities**, or say **\"help\"** to see everything I can do. 🤔",
    "Hmm, not sure about that. I can help with your **task summary**, **overdue alerts**, or **productivity tips**. Try one! 💡",
    "I specialize in your tasks and this project! Ask me **\"what should I do next\"** or **\"show my tasks\"** for real-time insights. 🎯",
];

pub const APOLOGY: &str = "😓 Sorry, something went wrong while looking at your tasks. Please try again in a moment!";

/// Simulated typing latency: `base_ms` plus up to `jitter_ms` of noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyDelay {
    pub base_ms: u64,
    pub jitter_ms: u64,
}

impl Default for ReplyDelay {
    fn default() -> Self {
        Self {
            base_ms: 600,
            jitter_ms: 900,
        }
    }
}

impl ReplyDelay {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.jitter_ms == 0 {
            return self.base_ms;
        }
        self.base_ms + rng.gen_range(0..self.jitter_ms)
    }
}

pub struct IntentMatcher {
    table: RuleTable,
    delay: ReplyDelay,
    upcoming_window_days: i64,
    list_limit: usize,
    utc_offset: FixedOffset,
}

impl IntentMatcher {
    pub fn new(table: RuleTable) -> Self {
        Self {
            table,
            delay: ReplyDelay::default(),
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
            list_limit: DEFAULT_RECENT_LIMIT,
            utc_offset: Utc.fix(),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            table: RuleTable::builtin(),
            delay: config.reply_delay,
            upcoming_window_days: config.upcoming_window_days,
            list_limit: config.list_limit,
            utc_offset: config.utc_offset,
        }
    }

    pub fn with_delay(mut self, delay: ReplyDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn delay(&self) -> ReplyDelay {
        self.delay
    }

    fn context<'a>(&self, tasks: &'a [Task], now: DateTime<Utc>) -> ReplyContext<'a> {
        ReplyContext {
            tasks,
            now,
            local_hour: now.with_timezone(&self.utc_offset).hour(),
            upcoming_window_days: self.upcoming_window_days,
            list_limit: self.list_limit,
        }
    }

    /// Produce the reply for one utterance.
    ///
    /// Never fails: a responder error becomes an apology and is only
    /// visible in the logs.
    pub fn respond<R: Rng + ?Sized>(
        &self,
        utterance: &str,
        tasks: &[Task],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> BotResponse {
        let normalized = utterance.trim().to_lowercase();

        if normalized.is_empty() {
            return BotResponse {
                text: EMPTY_PROMPT.to_string(),
                delay_ms: EMPTY_PROMPT_DELAY_MS,
            };
        }

        let Some((rule, score)) = self.table.best_match(&normalized) else {
            debug!(utterance = %normalized, "No rule matched, using fallback");
            let text = FALLBACKS.choose(rng).copied().unwrap_or(FALLBACKS[0]);
            return BotResponse {
                text: text.to_string(),
                delay_ms: FALLBACK_DELAY_MS,
            };
        };

        debug!(rule = %rule.id, score, "Matched rule");

        let clean = metrics::sanitize(tasks);
        let ctx = self.context(&clean, now);

        let text = match rule.responder.produce(&ctx) {
            Ok(text) => text,
            Err(error) => {
                warn!(rule = %rule.id, error = %error, "Responder failed, replying with apology");
                APOLOGY.to_string()
            }
        };

        BotResponse {
            text,
            delay_ms: self.delay.sample(rng),
        }
    }

    /// Welcome message built from the current task facts.
    pub fn welcome(&self, tasks: &[Task], now: DateTime<Utc>) -> Welcome {
        let clean = metrics::sanitize(tasks);
        replies::welcome(&self.context(&clean, now))
    }
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new(RuleTable::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssistantError;
    use crate::intent::rules::{Responder, Rule, RuleId};
    use crate::metrics::fixtures::{due_in, now, task};
    use crate::models::{TaskPriority, TaskStatus};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn three_tasks() -> Vec<Task> {
        vec![
            task(1, TaskStatus::Done, TaskPriority::Low),
            task(2, TaskStatus::InProgress, TaskPriority::Medium),
            due_in(task(3, TaskStatus::Todo, TaskPriority::Low), Duration::days(-1)),
        ]
    }

    #[test]
    fn test_my_tasks_summary() {
        let matcher = IntentMatcher::default();
        let response = matcher.respond("my tasks", &three_tasks(), now(), &mut rng());

        assert!(response.text.contains("3 total tasks"));
        assert!(response.text.contains("1 task overdue"));
        assert!((600..1500).contains(&response.delay_ms));
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let matcher = IntentMatcher::default();
        for tasks in [vec![], three_tasks()] {
            let response = matcher.respond("   ", &tasks, now(), &mut rng());
            assert_eq!(response.text, EMPTY_PROMPT);
            assert_eq!(response.delay_ms, EMPTY_PROMPT_DELAY_MS);
        }
    }

    #[test]
    fn test_unmatched_input_uses_fallback() {
        let matcher = IntentMatcher::default();
        let mut rng = rng();
        for _ in 0..10 {
            let response = matcher.respond("banana", &[], now(), &mut rng);
            assert!(FALLBACKS.contains(&response.text.as_str()));
            assert_eq!(response.delay_ms, FALLBACK_DELAY_MS);
        }
    }

    #[test]
    fn test_same_seed_same_reply() {
        let matcher = IntentMatcher::default();
        let a = matcher.respond("banana", &[], now(), &mut rng());
        let b = matcher.respond("banana", &[], now(), &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_and_whitespace_are_normalized() {
        let matcher = IntentMatcher::default();
        let response = matcher.respond("  WHAT SHOULD I DO  ", &three_tasks(), now(), &mut rng());
        assert!(response.text.contains("**Do this right now:** **Task 3**"));
    }

    #[test]
    fn test_static_rule_reply() {
        let matcher = IntentMatcher::default();
        let response = matcher.respond("what is your tech stack?", &[], now(), &mut rng());
        assert!(response.text.starts_with("🛠️ **Tech Stack:**"));
    }

    fn failing(_: &ReplyContext<'_>) -> crate::Result<String> {
        Err(AssistantError::ReplyFailed("boom".to_string()))
    }

    #[test]
    fn test_responder_failure_becomes_apology() {
        let table = RuleTable::new(vec![Rule::new(
            RuleId::TaskSummary,
            &["my tasks"],
            Responder::Generate(failing),
        )]);
        let matcher = IntentMatcher::new(table);

        let response = matcher.respond("my tasks", &three_tasks(), now(), &mut rng());
        assert_eq!(response.text, APOLOGY);
        assert!(!response.text.contains("boom"));
    }

    #[test]
    fn test_malformed_task_does_not_break_reply() {
        let mut broken = task(9, TaskStatus::Todo, TaskPriority::High);
        broken.title = String::new();
        let mut tasks = three_tasks();
        tasks.push(broken);

        let matcher = IntentMatcher::default();
        let response = matcher.respond("my tasks", &tasks, now(), &mut rng());
        assert!(response.text.contains("3 total tasks"));
    }

    #[test]
    fn test_fixed_delay_without_jitter() {
        let matcher = IntentMatcher::default().with_delay(ReplyDelay {
            base_ms: 50,
            jitter_ms: 0,
        });
        let response = matcher.respond("help", &[], now(), &mut rng());
        assert_eq!(response.delay_ms, 50);
    }

    #[test]
    fn test_greeting_uses_local_hour() {
        // fixture time is 12:00 UTC; UTC-5 makes it morning
        let matcher = IntentMatcher::default()
            .with_utc_offset(FixedOffset::west_opt(5 * 3600).unwrap());
        let response = matcher.respond("hello", &[], now(), &mut rng());
        assert!(response.text.starts_with("Good morning!"));
    }
}
