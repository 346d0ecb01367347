//! Pre-flight checks before talking to remote services.
//!
//! Validates that required keys are configured before starting operations
//! that would otherwise fail on the first request.

use crate::agent::ToolSet;
use crate::config::Settings;
use crate::error::{BreezeError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Running an agent requires a model key, plus a weather key for weather tools.
    Agent(&'a ToolSet),
    /// Weather chat requires a model key; the weather key is optional.
    WeatherChat,
    /// Direct weather queries require a weather key.
    Weather,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Agent(tools) => {
            check_model_key(settings)?;
            if tools.needs_weather() {
                check_weather_key(settings)?;
            }
        }
        Operation::WeatherChat => {
            check_model_key(settings)?;
        }
        Operation::Weather => {
            check_weather_key(settings)?;
        }
    }
    Ok(())
}

/// Check that the model provider's API key is configured.
fn check_model_key(settings: &Settings) -> Result<()> {
    if settings.model.has_api_key() {
        return Ok(());
    }
    let var = settings.model.provider.api_key_var();
    Err(BreezeError::Config(format!(
        "{} not set. Set it with: export {}='...'",
        var, var
    )))
}

/// Check that the OpenWeatherMap key is configured.
fn check_weather_key(settings: &Settings) -> Result<()> {
    if settings.weather.has_api_key() {
        return Ok(());
    }
    Err(BreezeError::Config(
        "OPENWEATHERMAP_API_KEY not set. Set it with: export OPENWEATHERMAP_API_KEY='...'"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolKind;
    use crate::config::ModelProvider;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_agent_without_tools_needs_only_model_key() {
        let mut settings = Settings::default();
        assert_err!(check(Operation::Agent(&ToolSet::new()), &settings));

        settings.model.api_key = Some("sk-test".to_string());
        assert_ok!(check(Operation::Agent(&ToolSet::new()), &settings));

        let weather_tools = ToolSet::new().with(ToolKind::GetWeather);
        let err = assert_err!(check(Operation::Agent(&weather_tools), &settings));
        assert!(err.to_string().contains("OPENWEATHERMAP_API_KEY"));
    }

    #[test]
    fn test_hint_names_provider_variable() {
        let mut settings = Settings::default();
        settings.model.provider = ModelProvider::OpenRouter;
        let err = check(Operation::WeatherChat, &settings).unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }
}
