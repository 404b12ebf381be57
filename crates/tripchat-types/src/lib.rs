//! Shared domain types for tripchat.
//!
//! Conversation turns and state, structured assistant output, content
//! queries, LLM request/response shapes, configuration, and error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod intent;
pub mod llm;
