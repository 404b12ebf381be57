//! Per-session conversation state and its lifecycle.
//!
//! - `SessionStore`: concurrency-safe map of session id to conversation state
//! - `SessionReaper`: background task evicting idle sessions

pub mod reaper;
pub mod store;
