//! Intent engine
//!
//! Keyword rules matched against a free-form utterance, answered from the
//! user's live task collection.

pub mod matcher;
pub mod quick_actions;
pub mod replies;
pub mod rules;

pub use matcher::{IntentMatcher, ReplyDelay};
pub use quick_actions::{QuickAction, QUICK_ACTIONS};
pub use rules::{ReplyContext, Responder, Rule, RuleId, RuleTable};
