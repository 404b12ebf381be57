//! Completion Service implementations.
//!
//! [`create_provider`] turns the `[completion]` config section into a
//! [`BoxLlmProvider`] the orchestrator can hold.

pub mod openai_compat;

use secrecy::SecretString;
use tracing::debug;

use tripchat_core::llm::box_provider::BoxLlmProvider;
use tripchat_types::config::{CompletionConfig, ProviderKind};
use tripchat_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{self as oai_config, OpenAiCompatConfig};

/// Build the configured Completion Service provider.
///
/// `api_key` is the already-resolved secret (see
/// [`crate::config::resolve_api_key`]). A missing key is an authentication
/// failure for every vendor.
pub fn create_provider(
    config: &CompletionConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;

    let mut oai = match config.provider {
        ProviderKind::OpenAi => oai_config::openai_defaults(key, &config.model),
        ProviderKind::Gemini => oai_config::gemini_defaults(key, &config.model),
        ProviderKind::Mistral => oai_config::mistral_defaults(key, &config.model),
        ProviderKind::Custom => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                LlmError::InvalidRequest("custom provider requires completion.base_url".to_string())
            })?;
            OpenAiCompatConfig {
                provider_name: "custom".to_string(),
                base_url,
                api_key: key,
                model: config.model.clone(),
            }
        }
    };

    // An explicit base URL wins over the vendor default.
    if let Some(base_url) = config.base_url.as_deref() {
        oai.base_url = base_url.trim_end_matches('/').to_string();
    }

    debug!(
        provider = %oai.provider_name,
        base_url = %oai.base_url,
        model = %oai.model,
        "completion provider configured"
    );

    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai)))
}
