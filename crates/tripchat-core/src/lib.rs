//! Chat core for Tripchat.
//!
//! Session state, the per-message pipeline and the ports (traits) for the two
//! external services. Depends only on `tripchat-types`; HTTP clients and
//! provider SDKs live in `tripchat-infra`.

pub mod chat;
pub mod content;
pub mod llm;
pub mod session;
