//! Error types for Breeze.

use thiserror::Error;

/// Library-level error type for Breeze operations.
#[derive(Error, Debug)]
pub enum BreezeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidToolArguments { tool: String, reason: String },

    #[error("Not supported by this model: {0}")]
    Unsupported(String),

    #[error("Weather service error: {0}")]
    Weather(String),

    #[error("Location not found: {0}")]
    WeatherNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Breeze operations.
pub type Result<T> = std::result::Result<T, BreezeError>;
