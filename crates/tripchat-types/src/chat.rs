//! Conversation types for tripchat.
//!
//! A conversation is an ordered, size-bounded list of [`Turn`]s plus the
//! timestamp of the last user activity. The session store owns every
//! [`ConversationState`]; callers only ever see cloned snapshots.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export MessageRole from llm module (turns and LLM messages share roles).
pub use crate::llm::MessageRole;
use crate::llm::Message;

/// Default number of turns retained per conversation.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Message shown alongside an empty or failed content lookup.
pub const NO_MATCHES_MESSAGE: &str = "No matching posts found.";

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: MessageRole,
    content: String,
}

impl Turn {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl From<Turn> for Message {
    fn from(turn: Turn) -> Self {
        Message {
            role: turn.role,
            content: turn.content,
        }
    }
}

/// Per-session conversation state.
///
/// `history` is oldest-first and never longer than the `max_history` passed
/// to [`ConversationState::push_turn`]; overflow drops from the front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub history: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl ConversationState {
    /// Create an empty conversation whose activity clock starts at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            history: Vec::new(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Append a turn, trimming the oldest turns beyond `max_history`.
    pub fn push_turn(&mut self, turn: Turn, max_history: usize, now: DateTime<Utc>) {
        self.history.push(turn);
        if self.history.len() > max_history {
            let excess = self.history.len() - max_history;
            self.history.drain(..excess);
        }
        self.touch(now);
    }

    /// Record live activity without changing history.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity_at {
            self.last_activity_at = now;
        }
    }

    /// Whether the conversation has been idle for longer than `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let idle = now
            .signed_duration_since(self.last_activity_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        idle > ttl
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// An opaque content item returned by the Content Search Service.
///
/// The chat core never inspects these; it only forwards them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentItem(pub serde_json::Value);

/// What happened to the optional content lookup for a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOutcome {
    /// The router decided no lookup was needed.
    NotRequested,
    /// The lookup ran and returned at least one item.
    Found,
    /// The lookup ran and returned nothing.
    NoMatches,
    /// The lookup failed or timed out; treated as no matches.
    Unavailable,
}

impl ContentOutcome {
    /// User-facing note for outcomes that produced no content after a lookup.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ContentOutcome::NoMatches | ContentOutcome::Unavailable => Some(NO_MATCHES_MESSAGE),
            ContentOutcome::NotRequested | ContentOutcome::Found => None,
        }
    }
}

/// Result of handling one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub matched_content: Vec<ContentItem>,
    pub content: ContentOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_message: Option<String>,
}

impl ChatReply {
    pub fn new(reply: String, matched_content: Vec<ContentItem>, content: ContentOutcome) -> Self {
        Self {
            reply,
            matched_content,
            content_message: content.message().map(str::to_string),
            content,
        }
    }
}
