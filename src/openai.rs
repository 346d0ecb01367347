//! OpenAI client configuration.

use crate::config::ModelSettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI-compatible client from model settings.
///
/// The API key is always taken from the settings, never from the
/// environment, so an unset key fails at the first request.
pub fn create_client(settings: &ModelSettings) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(settings, Duration::from_secs(settings.timeout_secs))
}

/// Create an OpenAI-compatible client with a custom timeout.
pub fn create_client_with_timeout(
    settings: &ModelSettings,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::new().with_api_key(settings.api_key.clone().unwrap_or_default());
    if let Some(base_url) = settings.effective_base_url() {
        config = config.with_api_base(base_url);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelProvider;
    use async_openai::config::Config;

    #[test]
    fn test_openrouter_client_base() {
        let settings = ModelSettings {
            provider: ModelProvider::OpenRouter,
            api_key: Some("sk-or".to_string()),
            ..Default::default()
        };
        let client = create_client(&settings).unwrap();
        assert_eq!(client.config().api_base(), "https://openrouter.ai/api/v1");
    }
}
