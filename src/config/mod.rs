//! Configuration module for Breeze.
//!
//! Handles loading settings from the config file and the environment.

mod env;
mod settings;

pub use env::load_dotenv;
pub use settings::{
    AgentSettings, GeneralSettings, ModelProvider, ModelSettings, Settings, WeatherSettings,
    DEFAULT_SYSTEM_PROMPT, WEATHER_SYSTEM_PROMPT,
};
