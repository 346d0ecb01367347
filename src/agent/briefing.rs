//! Weather context fetched ahead of a question.
//!
//! When a question is about the weather somewhere, the current observation
//! is looked up first and handed to the agent together with the question.

use crate::weather::{Observation, WeatherProvider};
use tracing::{debug, warn};

const WEATHER_KEYWORDS: [&str; 4] = ["weather", "temperature", "forecast", "climate"];
const PLACE_MARKERS: [&str; 4] = ["in", "at", "for", "of"];

/// Whether the question talks about weather.
pub fn mentions_weather(question: &str) -> bool {
    let lower = question.to_lowercase();
    WEATHER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// The word following the first place marker ("in", "at", "for", "of").
pub fn extract_city(question: &str) -> Option<String> {
    let words: Vec<&str> = question.split_whitespace().collect();
    let marker = words
        .iter()
        .position(|w| PLACE_MARKERS.contains(&w.to_lowercase().as_str()))?;

    let city = words
        .get(marker + 1)?
        .trim_matches(|c| matches!(c, '?' | '.' | ','));
    (!city.is_empty()).then(|| city.to_string())
}

/// What was learned about the weather before asking the agent.
#[derive(Debug, Clone)]
pub enum Briefing {
    /// Not a weather question, or no place could be found.
    Unrelated,
    Observed {
        city: String,
        observation: Observation,
    },
    Failed {
        city: String,
        reason: String,
    },
}

impl Briefing {
    /// Look up the weather for the place a question mentions.
    pub async fn prepare(
        question: &str,
        provider: Option<&dyn WeatherProvider>,
        country: Option<&str>,
    ) -> Self {
        if !mentions_weather(question) {
            return Briefing::Unrelated;
        }
        let Some(city) = extract_city(question) else {
            debug!("No place found in weather question");
            return Briefing::Unrelated;
        };
        let Some(provider) = provider else {
            return Briefing::Failed {
                city,
                reason: "no weather provider configured".to_string(),
            };
        };

        match provider.current_at_place(&city, country).await {
            Ok(observation) => Briefing::Observed { city, observation },
            Err(e) => {
                warn!("Weather prefetch for {} failed: {}", city, e);
                Briefing::Failed {
                    city,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// The task text to give the agent.
    pub fn to_task(&self, question: &str) -> String {
        match self {
            Briefing::Unrelated => question.to_string(),
            Briefing::Observed { city, observation } => format!(
                "{}\n\nHere's the current weather data for {}:\n{}",
                question,
                city,
                observation.summary()
            ),
            Briefing::Failed { city, reason } => format!(
                "{}\n\nNote: Could not get weather for {}: {}",
                question, city, reason
            ),
        }
    }
}

/// Build the task for a question, prefetching weather when relevant.
pub async fn prepare_task(
    question: &str,
    provider: Option<&dyn WeatherProvider>,
    country: Option<&str>,
) -> String {
    Briefing::prepare(question, provider, country)
        .await
        .to_task(question)
}
