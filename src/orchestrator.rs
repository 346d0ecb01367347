//! Assembly of agents from configuration.
//!
//! Builds the model client and weather provider once and hands out agents
//! wired to them.

use crate::agent::{prepare_task, Agent, TaskResult, ToolContext, ToolKind, ToolSet};
use crate::config::{Settings, WEATHER_SYSTEM_PROMPT};
use crate::error::{BreezeError, Result};
use crate::model::{ModelClient, OpenAIModelClient};
use crate::weather::{OpenWeatherClient, WeatherProvider};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Owns the shared clients and builds agents on top of them.
pub struct Orchestrator {
    settings: Settings,
    client: Arc<dyn ModelClient>,
    weather: Option<Arc<dyn WeatherProvider>>,
}

impl Orchestrator {
    /// Create an orchestrator from settings.
    ///
    /// The weather provider is only created when an API key is configured.
    pub fn new(settings: Settings) -> Result<Self> {
        if !settings.model.has_api_key() {
            return Err(BreezeError::Config(format!(
                "No API key for {}. Set {}.",
                settings.model.provider,
                settings.model.provider.api_key_var()
            )));
        }

        info!(
            "Using model {} via {}",
            settings.model.name, settings.model.provider
        );
        let client: Arc<dyn ModelClient> = Arc::new(OpenAIModelClient::new(&settings.model)?);

        let weather: Option<Arc<dyn WeatherProvider>> = if settings.weather.has_api_key() {
            Some(Arc::new(OpenWeatherClient::new(&settings.weather)?))
        } else {
            debug!("No OpenWeatherMap key configured, weather tools disabled");
            None
        };

        Ok(Self {
            settings,
            client,
            weather,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        client: Arc<dyn ModelClient>,
        weather: Option<Arc<dyn WeatherProvider>>,
    ) -> Self {
        Self {
            settings,
            client,
            weather,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> Arc<dyn ModelClient> {
        self.client.clone()
    }

    pub fn weather(&self) -> Option<Arc<dyn WeatherProvider>> {
        self.weather.clone()
    }

    fn default_country(&self) -> Option<String> {
        Some(self.settings.weather.default_country.clone()).filter(|c| !c.is_empty())
    }

    /// Build the configured assistant with the given tools.
    ///
    /// Weather tools need a weather provider; asking for them without one
    /// is a configuration error.
    pub fn agent(&self, tools: ToolSet) -> Result<Agent> {
        let agent_settings = &self.settings.agent;
        let mut context = ToolContext::new();

        if tools.needs_weather() {
            let provider = self.weather.clone().ok_or_else(|| {
                BreezeError::Config(
                    "Weather tools need an OpenWeatherMap API key. Set OPENWEATHERMAP_API_KEY."
                        .to_string(),
                )
            })?;
            context = context.with_weather(provider, self.default_country());
        }

        let mut agent = Agent::new(self.client.clone(), &agent_settings.name)
            .with_system_prompt(&agent_settings.system_prompt)
            .with_tools(tools)
            .with_tool_context(context)
            .with_max_iterations(agent_settings.max_iterations);
        if let Some(description) = &agent_settings.description {
            agent = agent.with_description(description);
        }
        Ok(agent)
    }

    /// Build the weather assistant: weather tools when a provider exists,
    /// otherwise a plain agent that relies on prefetched context.
    pub fn weather_agent(&self) -> Result<Agent> {
        let tools = if self.weather.is_some() {
            ToolSet::new()
                .with(ToolKind::GetWeather)
                .with(ToolKind::GetForecast)
        } else {
            ToolSet::new()
        };

        Ok(self
            .agent(tools)?
            .with_system_prompt(WEATHER_SYSTEM_PROMPT)
            .with_description("Answers questions about the weather"))
    }

    /// Answer a question with weather context looked up beforehand.
    #[instrument(skip(self))]
    pub async fn weather_chat(
        &self,
        question: &str,
        country: Option<&str>,
    ) -> Result<TaskResult> {
        let default_country = self.default_country();
        let country = country.or(default_country.as_deref());
        let task = prepare_task(question, self.weather.as_deref(), country).await;
        debug!("Weather task: {}", task);

        self.weather_agent()?.run(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Completion, ScriptedModelClient};

    fn orchestrator(responses: Vec<Completion>) -> (Orchestrator, Arc<ScriptedModelClient>) {
        let client = Arc::new(ScriptedModelClient::new(responses));
        let orchestrator = Orchestrator::with_components(Settings::default(), client.clone(), None);
        (orchestrator, client)
    }

    #[test]
    fn test_new_requires_model_key() {
        let err = Orchestrator::new(Settings::default()).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_new_without_weather_key() {
        let mut settings = Settings::default();
        settings.model.api_key = Some("sk-test".to_string());
        let orchestrator = Orchestrator::new(settings).unwrap();
        assert!(orchestrator.weather().is_none());
    }

    #[test]
    fn test_weather_tools_need_provider() {
        let (orchestrator, _) = orchestrator(Vec::new());
        assert!(matches!(
            orchestrator.agent(ToolSet::new().with(ToolKind::GetWeather)),
            Err(BreezeError::Config(_))
        ));
        let agent = orchestrator.agent(ToolSet::new().with(ToolKind::AddNumbers)).unwrap();
        assert_eq!(agent.name(), "my_assistant");
    }

    #[tokio::test]
    async fn test_weather_chat_without_provider_notes_failure() {
        let (orchestrator, client) = orchestrator(vec![Completion::text(
            "I couldn't fetch live data for Paris right now.",
        )]);

        let result = orchestrator
            .weather_chat("What's the weather in Paris?", None)
            .await
            .unwrap();
        assert!(result.final_content().contains("Paris"));

        let request = &client.requests()[0];
        assert!(request.tools.is_empty());
        let task = request.messages[1].content().unwrap();
        assert!(task.contains("Note: Could not get weather for Paris"));
    }
}
