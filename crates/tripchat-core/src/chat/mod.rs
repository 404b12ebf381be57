//! The chat pipeline: prompt assembly, output validation, intent routing and
//! the orchestrator that composes them per user message.

pub mod orchestrator;
pub mod prompt;
pub mod router;
pub mod validator;
