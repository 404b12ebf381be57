//! Infrastructure adapters for Tripchat.
//!
//! Implements the ports defined in `tripchat-core` against real services:
//! the OpenAI-compatible Completion Service, the HTTP posts search service,
//! plus the TOML configuration loader.

pub mod config;
pub mod content;
pub mod llm;

#[cfg(test)]
mod test_support;
