//! Chat transcript
//!
//! Append-only, in arrival order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_arrival_order() {
        let now = Utc::now();
        let mut transcript = Transcript::new();
        transcript.push(Message::new(MessageRole::Assistant, "welcome", now));
        transcript.push(Message::new(MessageRole::User, "my tasks", now));

        let roles: Vec<MessageRole> = transcript.messages().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::Assistant, MessageRole::User]);
        assert_eq!(transcript.last().map(|m| m.text.as_str()), Some("my tasks"));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_long_conversation_is_never_trimmed() {
        let now = Utc::now();
        let mut transcript = Transcript::new();
        for turn in 0..500 {
            transcript.push(Message::new(MessageRole::User, format!("turn {}", turn), now));
        }

        assert_eq!(transcript.len(), 500);
        assert_eq!(transcript.messages().next().map(|m| m.text.as_str()), Some("turn 0"));
        assert_eq!(transcript.last().map(|m| m.text.as_str()), Some("turn 499"));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let now = Utc::now();
        let a = Message::new(MessageRole::User, "hi", now);
        let b = Message::new(MessageRole::User, "hi", now);
        assert_ne!(a.id, b.id);
    }
}
