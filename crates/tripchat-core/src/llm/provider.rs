//! LlmProvider trait definition.
//!
//! The Completion Service port. Concrete backends live in tripchat-infra.

use tripchat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for Completion Service backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap in
/// [`super::box_provider::BoxLlmProvider`] for dynamic dispatch.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "gemini").
    fn name(&self) -> &str;

    /// The model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// The returned text is whatever the model produced; callers must not
    /// assume it is well-formed.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
