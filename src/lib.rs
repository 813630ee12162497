//! TaskFlow Assistant
//!
//! Analytics and conversational core for a personal task manager:
//! - Derives facts (overdue, upcoming, streaks, completion rate) from a task collection
//! - Answers free-form chat with a keyword rule table and live task facts
//! - Synthesizes prioritized insight cards for the dashboard
//! - Sequences a chat session with cancellable typing delays
//!
//! FLOW:
//! TASK SOURCE → METRICS → INTENT MATCHER | INSIGHT SYNTHESIZER → SESSION / API

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod insights;
pub mod intent;
pub mod markup;
pub mod metrics;
pub mod models;
pub mod session;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use config::AssistantConfig;
pub use insights::{create_default_synthesizer, InsightSynthesizer};
pub use intent::IntentMatcher;
pub use session::{ConversationSession, SessionState};
