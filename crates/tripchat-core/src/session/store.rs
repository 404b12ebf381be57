//! Concurrent in-memory store of per-session conversation state.
//!
//! Backed by `DashMap`, so independent sessions only contend when they hash
//! to the same shard. Every mutation of a session happens under that
//! session's shard write lock, and [`SessionStore::sweep_expired`] uses
//! `retain`, which takes the same locks. An append and a sweep therefore
//! never interleave: either the append lands first and refreshes the
//! activity clock, or the sweep removes the session first and the append
//! becomes a no-op.
//!
//! All reads return cloned snapshots -- never hold a `DashMap` guard across
//! an `.await`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use tripchat_types::chat::{ConversationState, DEFAULT_MAX_HISTORY, Turn};

/// Owns every [`ConversationState`], keyed by an opaque session identifier.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, ConversationState>,
    max_history: usize,
}

impl SessionStore {
    /// Create an empty store that keeps at most `max_history` turns per session.
    ///
    /// A `max_history` of zero is raised to one so an append is never lost
    /// before it can be observed.
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_history: max_history.max(1),
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Return the session's state, creating an empty one if it does not exist.
    ///
    /// Counts as live activity: an existing session's clock is refreshed.
    pub fn get_or_create(&self, session_id: &str) -> ConversationState {
        self.get_or_create_at(session_id, Utc::now())
    }

    pub(crate) fn get_or_create_at(&self, session_id: &str, now: DateTime<Utc>) -> ConversationState {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, "creating conversation");
                ConversationState::new(now)
            });
        entry.touch(now);
        entry.value().clone()
    }

    /// Append a turn to an existing session and return the updated snapshot.
    ///
    /// Returns `None` without doing anything when the session does not exist;
    /// callers are expected to [`get_or_create`](Self::get_or_create) first.
    pub fn append_turn(&self, session_id: &str, turn: Turn) -> Option<ConversationState> {
        self.append_turn_at(session_id, turn, Utc::now())
    }

    pub(crate) fn append_turn_at(
        &self,
        session_id: &str,
        turn: Turn,
        now: DateTime<Utc>,
    ) -> Option<ConversationState> {
        let mut state = self.sessions.get_mut(session_id)?;
        state.push_turn(turn, self.max_history, now);
        Some(state.value().clone())
    }

    /// Remove the session if present. Idempotent.
    ///
    /// Returns `true` if a session was removed.
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            debug!(session_id, "cleared conversation");
        }
        removed
    }

    /// Remove every session idle for longer than `ttl` at `now`.
    ///
    /// Returns the number of sessions evicted.
    pub fn sweep_expired(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|session_id, state| {
            let expired = state.is_expired(now, ttl);
            if expired {
                debug!(session_id = %session_id, last_activity_at = %state.last_activity_at, "evicting idle conversation");
                evicted += 1;
            }
            !expired
        });
        evicted
    }

    /// Cloned state of a session without counting as activity.
    pub fn snapshot(&self, session_id: &str) -> Option<ConversationState> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
