//! Weather chat command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the weather-chat command.
pub async fn run_weather_chat(
    question: &str,
    country: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::WeatherChat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'breeze doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    if !settings.weather.has_api_key() {
        Output::warning("OPENWEATHERMAP_API_KEY not set; answering without live weather data.");
    }

    let orchestrator = Orchestrator::new(settings)?;
    let spinner = Output::spinner("Checking the weather...");

    match orchestrator.weather_chat(question, country.as_deref()).await {
        Ok(result) => {
            spinner.finish_and_clear();
            println!("\n{}\n", result.final_content());
            for call in &result.tool_calls {
                Output::tool_call(call, false);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Weather chat failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
