//! Per-provider defaults for OpenAI-compatible endpoints.

use secrecy::SecretString;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Google's OpenAI-compatible Gemini endpoint.
pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for an [`super::OpenAiCompatibleProvider`].
///
/// No `Debug`: the struct carries the API key.
pub struct OpenAiCompatConfig {
    /// Provider name as configured ("openai", "google").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
}

pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        model: model.into(),
    }
}

pub fn google_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "google".into(),
        base_url: GOOGLE_BASE_URL.into(),
        api_key,
        model: model.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_uses_gemini_compat_endpoint() {
        let config = google_defaults(SecretString::from("key".to_string()), "gemini-2.0-flash");
        assert_eq!(config.provider_name, "google");
        assert!(config.base_url.ends_with("/v1beta/openai"));
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[test]
    fn openai_uses_public_api() {
        let config = openai_defaults(SecretString::from("sk".to_string()), "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }
}
