//! Tool definitions and implementations for the agent system.

use crate::error::{BreezeError, Result};
use crate::model::ToolSchema;
use crate::weather::WeatherProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// The closed set of tools an agent can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GetWeather,
    GetWeatherAtCoords,
    GetForecast,
    AddNumbers,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::GetWeather,
        ToolKind::GetWeatherAtCoords,
        ToolKind::GetForecast,
        ToolKind::AddNumbers,
    ];

    /// Function name advertised to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::GetWeather => "get_weather",
            ToolKind::GetWeatherAtCoords => "get_weather_at_coords",
            ToolKind::GetForecast => "get_forecast",
            ToolKind::AddNumbers => "add_numbers",
        }
    }

    /// Look up a tool by its function name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether the tool needs a weather provider.
    pub fn needs_weather(&self) -> bool {
        !matches!(self, ToolKind::AddNumbers)
    }

    /// Function schema for the model.
    pub fn schema(&self) -> ToolSchema {
        let (description, parameters) = match self {
            ToolKind::GetWeather => (
                "Get the current weather for a city. \
                Use this whenever the user asks about current conditions somewhere.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "City name, e.g. Chennai"
                        },
                        "country_code": {
                            "type": "string",
                            "description": "Two-letter ISO country code, e.g. IN"
                        }
                    },
                    "required": ["city"]
                }),
            ),
            ToolKind::GetWeatherAtCoords => (
                "Get the current weather at a latitude/longitude.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "lat": { "type": "number", "description": "Latitude in degrees" },
                        "lon": { "type": "number", "description": "Longitude in degrees" }
                    },
                    "required": ["lat", "lon"]
                }),
            ),
            ToolKind::GetForecast => (
                "Get the 3-hourly weather forecast for a city.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "city": { "type": "string", "description": "City name" },
                        "country_code": {
                            "type": "string",
                            "description": "Two-letter ISO country code"
                        },
                        "periods": {
                            "type": "integer",
                            "description": "Number of 3-hour periods (default: 8)",
                            "default": 8
                        }
                    },
                    "required": ["city"]
                }),
            ),
            ToolKind::AddNumbers => (
                "Add two integers and return their sum.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "a": { "type": "integer" },
                        "b": { "type": "integer" }
                    },
                    "required": ["a", "b"]
                }),
            ),
        };

        ToolSchema {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

impl std::str::FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weather" => Ok(ToolKind::GetWeather),
            "coords" => Ok(ToolKind::GetWeatherAtCoords),
            "forecast" => Ok(ToolKind::GetForecast),
            "add" | "sum" => Ok(ToolKind::AddNumbers),
            other => ToolKind::from_name(other).ok_or_else(|| format!("Unknown tool: {}", s)),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Current weather for a city.
    GetWeather {
        city: String,
        #[serde(default)]
        country_code: Option<String>,
    },

    /// Current weather at coordinates.
    GetWeatherAtCoords { lat: f64, lon: f64 },

    /// Forecast for a city.
    GetForecast {
        city: String,
        #[serde(default)]
        country_code: Option<String>,
        #[serde(default = "default_periods")]
        periods: usize,
    },

    /// Integer addition.
    AddNumbers { a: i64, b: i64 },
}

fn default_periods() -> usize {
    8
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::GetWeather { .. } => ToolKind::GetWeather,
            ToolCall::GetWeatherAtCoords { .. } => ToolKind::GetWeatherAtCoords,
            ToolCall::GetForecast { .. } => ToolKind::GetForecast,
            ToolCall::AddNumbers { .. } => ToolKind::AddNumbers,
        }
    }
}

/// Parse a tool call from the model's function name and JSON arguments.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    if ToolKind::from_name(name).is_none() {
        return Err(BreezeError::UnknownTool(name.to_string()));
    }

    let invalid = |reason: String| BreezeError::InvalidToolArguments {
        tool: name.to_string(),
        reason,
    };

    let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
    let mut args: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;

    let object = args
        .as_object_mut()
        .ok_or_else(|| invalid("arguments must be a JSON object".to_string()))?;
    object.insert("name".to_string(), serde_json::Value::String(name.to_string()));

    serde_json::from_value(args).map_err(|e| invalid(e.to_string()))
}

/// The tools registered with an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSet {
    kinds: Vec<ToolKind>,
}

impl ToolSet {
    /// An empty tool set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every available tool.
    pub fn all() -> Self {
        Self::from_kinds(ToolKind::ALL)
    }

    /// Build a set, dropping duplicates while keeping order.
    pub fn from_kinds(kinds: impl IntoIterator<Item = ToolKind>) -> Self {
        let mut set = Self::new();
        for kind in kinds {
            set = set.with(kind);
        }
        set
    }

    /// Add a tool.
    pub fn with(mut self, kind: ToolKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> &[ToolKind] {
        &self.kinds
    }

    pub fn needs_weather(&self) -> bool {
        self.kinds.iter().any(ToolKind::needs_weather)
    }

    /// Schemas for every registered tool.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.kinds.iter().map(ToolKind::schema).collect()
    }

    /// Parse a tool call, rejecting tools not registered in this set.
    pub fn resolve(&self, name: &str, arguments: &str) -> Result<ToolCall> {
        match ToolKind::from_name(name) {
            Some(kind) if self.contains(kind) => parse_tool_call(name, arguments),
            _ => Err(BreezeError::UnknownTool(name.to_string())),
        }
    }
}

/// Tool execution context with access to external services.
#[derive(Clone, Default)]
pub struct ToolContext {
    weather: Option<Arc<dyn WeatherProvider>>,
    default_country: Option<String>,
}

impl ToolContext {
    /// A context without external services.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a weather provider and the country used when none is given.
    pub fn with_weather(
        mut self,
        provider: Arc<dyn WeatherProvider>,
        default_country: Option<String>,
    ) -> Self {
        self.weather = Some(provider);
        self.default_country = default_country.filter(|c| !c.is_empty());
        self
    }

    pub fn has_weather(&self) -> bool {
        self.weather.is_some()
    }

    /// Execute a tool call and return the result as a string.
    ///
    /// Weather lookups that fail are reported in the returned text so the
    /// model can tell the user; only misconfiguration and invalid input
    /// surface as errors.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::GetWeather { city, country_code } => {
                self.execute_get_weather(city, country_code.as_deref()).await
            }
            ToolCall::GetWeatherAtCoords { lat, lon } => {
                self.execute_get_weather_at_coords(*lat, *lon).await
            }
            ToolCall::GetForecast {
                city,
                country_code,
                periods,
            } => {
                self.execute_get_forecast(city, country_code.as_deref(), *periods)
                    .await
            }
            ToolCall::AddNumbers { a, b } => execute_add_numbers(*a, *b),
        }
    }

    fn provider(&self) -> Result<&Arc<dyn WeatherProvider>> {
        self.weather
            .as_ref()
            .ok_or_else(|| BreezeError::Config("No weather provider configured".to_string()))
    }

    fn country<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .filter(|c| !c.trim().is_empty())
            .or(self.default_country.as_deref())
    }

    async fn execute_get_weather(&self, city: &str, country: Option<&str>) -> Result<String> {
        if city.trim().is_empty() {
            return Err(BreezeError::InvalidToolArguments {
                tool: ToolKind::GetWeather.name().to_string(),
                reason: "city must not be empty".to_string(),
            });
        }
        let provider = self.provider()?;
        match provider.current_at_place(city, self.country(country)).await {
            Ok(observation) => Ok(observation.summary()),
            Err(e) => {
                warn!("Weather lookup for {} failed: {}", city, e);
                Ok(lookup_failed(city, &e))
            }
        }
    }

    async fn execute_get_weather_at_coords(&self, lat: f64, lon: f64) -> Result<String> {
        let provider = self.provider()?;
        match provider.current_at_coords(lat, lon).await {
            Ok(observation) => Ok(observation.summary()),
            Err(e) => {
                warn!("Weather lookup for {}, {} failed: {}", lat, lon, e);
                Ok(lookup_failed(&format!("{}, {}", lat, lon), &e))
            }
        }
    }

    async fn execute_get_forecast(
        &self,
        city: &str,
        country: Option<&str>,
        periods: usize,
    ) -> Result<String> {
        if city.trim().is_empty() {
            return Err(BreezeError::InvalidToolArguments {
                tool: ToolKind::GetForecast.name().to_string(),
                reason: "city must not be empty".to_string(),
            });
        }
        let provider = self.provider()?;
        let periods = periods.clamp(1, 40);
        match provider
            .forecast_at_place(city, self.country(country), periods)
            .await
        {
            Ok(forecast) => Ok(forecast.summary()),
            Err(e) => {
                warn!("Forecast lookup for {} failed: {}", city, e);
                Ok(lookup_failed(city, &e))
            }
        }
    }
}

fn execute_add_numbers(a: i64, b: i64) -> Result<String> {
    let sum = a
        .checked_add(b)
        .ok_or_else(|| BreezeError::InvalidToolArguments {
            tool: ToolKind::AddNumbers.name().to_string(),
            reason: format!("{} + {} overflows", a, b),
        })?;
    Ok(format!("The sum of {} and {} is {}", a, b, sum))
}

/// Text returned to the model when a weather lookup fails.
pub fn lookup_failed(place: &str, error: &BreezeError) -> String {
    format!("Could not get weather for {}: {}", place, error)
}
