//! Environment overlay for settings.
//!
//! Credentials normally live in the process environment (often loaded from a
//! `.env` file). They are read once at startup and folded into [`Settings`];
//! nothing else in the crate looks at the environment.

use super::settings::{ModelProvider, Settings};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Load a `.env` file into the process environment.
///
/// A missing default `.env` is not an error; an explicitly named file that
/// cannot be read is reported and skipped.
pub fn load_dotenv(path: Option<&Path>) {
    match path {
        Some(p) => {
            if let Err(e) = dotenv::from_path(p) {
                warn!("Could not load env file {}: {}", p.display(), e);
            }
        }
        None => {
            if let Ok(p) = dotenv::dotenv() {
                debug!("Loaded environment from {}", p.display());
            }
        }
    }
}

impl Settings {
    /// Apply overrides from the current process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(&std::env::vars().collect());
    }

    /// Apply overrides from a variable map.
    ///
    /// `BREEZE_PROVIDER`, `BREEZE_MODEL` and `BREEZE_BASE_URL` replace the
    /// model settings; the provider's key variable (`OPENAI_API_KEY` or
    /// `OPENROUTER_API_KEY`) and `OPENWEATHERMAP_API_KEY` fill in keys.
    pub fn apply_vars(&mut self, vars: &HashMap<String, String>) {
        let get = |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned();

        if let Some(provider) = get("BREEZE_PROVIDER") {
            match provider.parse::<ModelProvider>() {
                Ok(p) => self.model.provider = p,
                Err(e) => warn!("Ignoring BREEZE_PROVIDER: {}", e),
            }
        }
        if let Some(model) = get("BREEZE_MODEL") {
            self.model.name = model;
        }
        if let Some(base_url) = get("BREEZE_BASE_URL") {
            self.model.base_url = Some(base_url);
        }

        if let Some(key) = get(self.model.provider.api_key_var()) {
            self.model.api_key = Some(key);
        }
        if let Some(key) = get("OPENWEATHERMAP_API_KEY") {
            self.weather.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_openai_key() {
        let mut settings = Settings::default();
        settings.apply_vars(&vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENWEATHERMAP_API_KEY", "owm-test"),
        ]));
        assert_eq!(settings.model.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.weather.api_key.as_deref(), Some("owm-test"));
    }

    #[test]
    fn test_provider_switch_picks_matching_key() {
        let mut settings = Settings::default();
        settings.apply_vars(&vars(&[
            ("BREEZE_PROVIDER", "openrouter"),
            ("BREEZE_MODEL", "deepseek/deepseek-chat-v3.1"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("OPENROUTER_API_KEY", "sk-or"),
        ]));
        assert_eq!(settings.model.provider, ModelProvider::OpenRouter);
        assert_eq!(settings.model.name, "deepseek/deepseek-chat-v3.1");
        assert_eq!(settings.model.api_key.as_deref(), Some("sk-or"));
    }

    #[test]
    fn test_empty_and_invalid_values_ignored() {
        let mut settings = Settings::default();
        settings.apply_vars(&vars(&[
            ("BREEZE_PROVIDER", "nonsense"),
            ("OPENAI_API_KEY", ""),
        ]));
        assert_eq!(settings.model.provider, ModelProvider::OpenAI);
        assert!(settings.model.api_key.is_none());
    }
}
