//! Chat model providers.
//!
//! [`create_chat_model`] builds the provider selected by `AI_PROVIDER`.

pub mod openai_compat;

use std::sync::Arc;

use secrecy::SecretString;

use panday_core::llm::ChatModel;
use panday_types::config::AiProvider;
use panday_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;

/// Build the configured chat model.
///
/// # Errors
///
/// [`LlmError::AuthenticationFailed`] when no API key is available.
pub fn create_chat_model(
    provider: AiProvider,
    api_key: Option<&SecretString>,
    model: &str,
) -> Result<Arc<dyn ChatModel>, LlmError> {
    let key = api_key.cloned().ok_or(LlmError::AuthenticationFailed)?;
    let provider: Arc<dyn ChatModel> = match provider {
        AiProvider::OpenAi => Arc::new(OpenAiCompatibleProvider::openai(key, model)),
        AiProvider::Google => Arc::new(OpenAiCompatibleProvider::google(key, model)),
    };
    tracing::info!(provider = provider.name(), model = provider.model(), "chat model ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_selected_provider() {
        let key = SecretString::from("key".to_string());
        let model = create_chat_model(AiProvider::Google, Some(&key), "gemini-2.0-flash").unwrap();
        assert_eq!(model.name(), "google");
        assert_eq!(model.model(), "gemini-2.0-flash");

        let model = create_chat_model(AiProvider::OpenAi, Some(&key), "gpt-4o-mini").unwrap();
        assert_eq!(model.name(), "openai");
    }

    #[test]
    fn missing_key_fails() {
        assert!(matches!(
            create_chat_model(AiProvider::OpenAi, None, "gpt-4o-mini"),
            Err(LlmError::AuthenticationFailed)
        ));
    }
}
