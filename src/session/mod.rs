//! Conversation session
//!
//! Sequences one chat: welcome on activation, then strict turn-taking
//! between the user and the assistant. A reply is held back for its typing
//! delay on a timer that teardown can cancel; a cancelled reply is dropped.

pub mod source;
pub mod transcript;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{AssistantError, Result};
use crate::intent::IntentMatcher;
use crate::models::{Task, Welcome};

pub use source::{
    source_from_config, FileTaskSource, HttpTaskSource, InMemoryTaskSource, TaskSource,
};
pub use transcript::{Message, MessageRole, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingReply,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AwaitingReply => write!(f, "awaiting_reply"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

pub struct ConversationSession {
    id: Uuid,
    source: Arc<dyn TaskSource>,
    matcher: IntentMatcher,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    transcript: Transcript,
    state: SessionState,
    /// Last collection fetched successfully
    snapshot: Vec<Task>,
    pending: Option<String>,
    welcomed: bool,
    shutdown: CancellationToken,
}

impl ConversationSession {
    pub fn new(source: Arc<dyn TaskSource>, matcher: IntentMatcher) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            matcher,
            clock: Arc::new(SystemClock),
            rng: StdRng::from_entropy(),
            transcript: Transcript::new(),
            state: SessionState::Idle,
            snapshot: Vec::new(),
            pending: None,
            welcomed: false,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        if self.shutdown.is_cancelled() {
            return SessionState::Closed;
        }
        self.state
    }

    /// True while a reply is being prepared
    pub fn is_typing(&self) -> bool {
        self.state() == SessionState::AwaitingReply
    }

    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.transcript.messages()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Token that tears the session down from another task
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Post the welcome message. Only the first call does anything.
    pub async fn activate(&mut self) -> Result<Option<Welcome>> {
        self.ensure_open()?;
        if self.welcomed {
            return Ok(None);
        }

        let tasks = self.refresh_tasks().await;
        let now = self.clock.now();
        let welcome = self.matcher.welcome(&tasks, now);

        self.transcript
            .push(Message::new(MessageRole::Assistant, welcome.text.clone(), now));
        self.welcomed = true;

        info!(
            session_id = %self.id,
            tasks = tasks.len(),
            urgent = welcome.urgent,
            "Session activated"
        );

        Ok(Some(welcome))
    }

    /// Record the user's utterance and start a turn.
    ///
    /// Rejected input leaves the transcript and state untouched.
    pub fn submit(&mut self, utterance: &str) -> Result<()> {
        self.ensure_open()?;

        let text = utterance.trim();
        if text.is_empty() {
            return Err(AssistantError::EmptyUtterance);
        }

        if self.state == SessionState::AwaitingReply {
            debug!(session_id = %self.id, "Ignoring utterance while a reply is in flight");
            return Err(AssistantError::ReplyInFlight);
        }

        self.transcript
            .push(Message::new(MessageRole::User, text, self.clock.now()));
        self.pending = Some(text.to_string());
        self.state = SessionState::AwaitingReply;

        debug!(session_id = %self.id, state = %self.state, "Utterance accepted");

        Ok(())
    }

    /// Produce, delay and post the reply to the pending utterance.
    pub async fn await_reply(&mut self) -> Result<Message> {
        self.ensure_open()?;

        let Some(utterance) = self.pending.clone() else {
            return Err(AssistantError::NoPendingUtterance);
        };

        let tasks = self.refresh_tasks().await;
        let response = self
            .matcher
            .respond(&utterance, &tasks, self.clock.now(), &mut self.rng);

        let shutdown = self.shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(response.delay_ms)) => {}
            _ = shutdown.cancelled() => {
                warn!(session_id = %self.id, "Session closed while typing, reply discarded");
                self.mark_closed();
                return Err(AssistantError::SessionClosed);
            }
        }

        let message = Message::new(MessageRole::Assistant, response.text, self.clock.now());
        self.transcript.push(message.clone());
        self.pending = None;
        self.state = SessionState::Idle;

        debug!(
            session_id = %self.id,
            delay_ms = response.delay_ms,
            state = %self.state,
            "Reply posted"
        );

        Ok(message)
    }

    /// One full turn: `submit` followed by `await_reply`
    pub async fn send(&mut self, utterance: &str) -> Result<Message> {
        self.submit(utterance)?;
        self.await_reply().await
    }

    pub fn close(&mut self) {
        self.shutdown.cancel();
        self.mark_closed();
        info!(session_id = %self.id, messages = self.transcript.len(), "Session closed");
    }

    async fn refresh_tasks(&mut self) -> Vec<Task> {
        match self.source.fetch_current_tasks().await {
            Ok(tasks) => {
                self.snapshot = tasks.clone();
                tasks
            }
            Err(error) => {
                warn!(
                    session_id = %self.id,
                    error = %error,
                    snapshot = self.snapshot.len(),
                    "Task fetch failed, using last snapshot"
                );
                self.snapshot.clone()
            }
        }
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            self.mark_closed();
        }
        if self.state == SessionState::Closed {
            return Err(AssistantError::SessionClosed);
        }
        Ok(())
    }

    fn mark_closed(&mut self) {
        self.pending = None;
        self.state = SessionState::Closed;
    }
}

/// Drive `fut` to completion unless `shutdown` fires first, in which case
/// the future is dropped and `None` comes back.
pub async fn until_shutdown<F: Future>(shutdown: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        output = fut => Some(output),
        _ = shutdown.cancelled() => None,
    }
}
