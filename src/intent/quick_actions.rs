//! Quick actions
//!
//! Canned queries offered next to the welcome message. Each one is an
//! ordinary utterance, so it goes through the same rule table as typed input.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickAction {
    pub label: &'static str,
    pub query: &'static str,
}

pub const QUICK_ACTIONS: [QuickAction; 6] = [
    QuickAction {
        label: "📊 My Tasks",
        query: "my tasks",
    },
    QuickAction {
        label: "⚠️ Overdue",
        query: "overdue tasks",
    },
    QuickAction {
        label: "📅 Deadlines",
        query: "upcoming deadlines",
    },
    QuickAction {
        label: "🔴 Priority",
        query: "high priority",
    },
    QuickAction {
        label: "🎯 What Next?",
        query: "what should I do",
    },
    QuickAction {
        label: "💡 Tips",
        query: "productivity tips",
    },
];

/// Resolve a `/N` shortcut (1-based) to its quick action.
pub fn shortcut(input: &str) -> Option<&'static QuickAction> {
    let index: usize = input.trim().strip_prefix('/')?.parse().ok()?;
    QUICK_ACTIONS.get(index.checked_sub(1)?)
}
