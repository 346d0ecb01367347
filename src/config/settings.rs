//! Configuration settings for Breeze.

use crate::model::ModelInfo;
use crate::weather::Units;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default system prompt for general-purpose agents.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that can answer questions and help with tasks.";

/// System prompt for the weather briefing agent.
pub const WEATHER_SYSTEM_PROMPT: &str = r#"You are a helpful AI Agent Assistant with access to real-time weather information.
You can provide current weather data for any city when users ask about weather conditions.
If the weather data could not be retrieved, say so plainly and never make up readings.
Always be friendly and provide weather information in a clear, easy-to-understand format."#;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub agent: AgentSettings,
    pub weather: WeatherSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Optional `.env` file loaded before environment overrides are applied.
    pub env_file: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            env_file: None,
        }
    }
}

/// Chat-completion provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// api.openai.com (default).
    #[default]
    OpenAI,
    /// OpenRouter's OpenAI-compatible endpoint.
    OpenRouter,
}

impl ModelProvider {
    /// Base URL used when none is configured explicitly.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ModelProvider::OpenAI => None,
            ModelProvider::OpenRouter => Some("https://openrouter.ai/api/v1"),
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ModelProvider::OpenAI => "OPENAI_API_KEY",
            ModelProvider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ModelProvider::OpenAI),
            "openrouter" => Ok(ModelProvider::OpenRouter),
            _ => Err(format!("Unknown model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::OpenAI => write!(f, "openai"),
            ModelProvider::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// Model client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub provider: ModelProvider,
    /// Model identifier sent with every request.
    pub name: String,
    /// Custom OpenAI-compatible endpoint. Falls back to the provider default.
    pub base_url: Option<String>,
    /// API key. Usually supplied through the environment rather than the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Capability descriptor for models the client library does not know.
    pub info: Option<ModelInfo>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAI,
            name: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
            timeout_secs: 300,
            info: None,
        }
    }
}

impl ModelSettings {
    /// Base URL to use, honouring the provider default.
    pub fn effective_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
    }

    /// Whether an API key is present and non-empty.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

/// Agent defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Display name used as the source of agent events.
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: String,
    /// Maximum model round trips per task.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: "my_assistant".to_string(),
            description: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: 10,
        }
    }
}

/// OpenWeatherMap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: Units,
    /// Country code used when a lookup does not name one.
    pub default_country: String,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org".to_string(),
            units: Units::Metric,
            default_country: "US".to_string(),
            timeout_secs: 30,
        }
    }
}

impl WeatherSettings {
    /// Whether an API key is present and non-empty.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::BreezeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("breeze")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Copy with secrets blanked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.model.api_key.is_some() {
            copy.model.api_key = Some("<redacted>".to_string());
        }
        if copy.weather.api_key.is_some() {
            copy.weather.api_key = Some("<redacted>".to_string());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.provider, ModelProvider::OpenAI);
        assert_eq!(settings.model.name, "gpt-4o-mini");
        assert_eq!(settings.agent.max_iterations, 10);
        assert_eq!(settings.weather.default_country, "US");
        assert!(!settings.model.has_api_key());
    }

    #[test]
    fn test_openrouter_base_url() {
        let mut model = ModelSettings {
            provider: ModelProvider::OpenRouter,
            ..Default::default()
        };
        assert_eq!(
            model.effective_base_url().as_deref(),
            Some("https://openrouter.ai/api/v1")
        );

        model.base_url = Some("http://localhost:8080/v1".to_string());
        assert_eq!(
            model.effective_base_url().as_deref(),
            Some("http://localhost:8080/v1")
        );
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            provider = "openrouter"
            name = "deepseek/deepseek-chat-v3.1"

            [model.info]
            family = "deepseek"
            provider = "openrouter/openrouter"
            type = "chat"
            vision = true
            function_calling = true
            context_length = 8192
            max_tokens = 4096

            [weather]
            units = "imperial"
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.provider, ModelProvider::OpenRouter);
        let info = settings.model.info.unwrap();
        assert_eq!(info.family, "deepseek");
        assert!(info.function_calling);
        assert!(!info.json_output);
        assert_eq!(settings.weather.units, Units::Imperial);
        assert_eq!(settings.agent.name, "my_assistant");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.agent.name = "WeatherAgent".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.agent.name, "WeatherAgent");
    }

    #[test]
    fn test_redacted_hides_keys() {
        let mut settings = Settings::default();
        settings.model.api_key = Some("sk-secret".to_string());
        let shown = toml::to_string_pretty(&settings.redacted()).unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
