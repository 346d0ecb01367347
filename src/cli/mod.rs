//! CLI module for Breeze.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Breeze - tool-using chat agents
///
/// Ask a model a question, optionally letting it call tools such as live
/// weather lookups, and watch each step of its work.
#[derive(Parser, Debug)]
#[command(name = "breeze")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single task and print the final answer
    Ask {
        /// The task for the agent (e.g., "tell me a joke")
        task: String,

        /// Attach an image (file path or http(s)/data URL); repeatable
        #[arg(short, long)]
        image: Vec<String>,

        /// Register a tool (get_weather, get_weather_at_coords, get_forecast, add_numbers); repeatable
        #[arg(short, long)]
        tool: Vec<String>,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Override the system prompt
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Run a task with streaming and print every event as it arrives
    Observe {
        /// The task for the agent
        task: String,

        /// Register a tool; repeatable
        #[arg(short, long)]
        tool: Vec<String>,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Print tool arguments and results in full
        #[arg(short, long)]
        detailed: bool,
    },

    /// Ask a weather question, with current conditions looked up first
    WeatherChat {
        /// The question (e.g., "What's the weather like in Chennai?")
        question: String,

        /// Country code used for the lookup
        #[arg(long)]
        country: Option<String>,
    },

    /// Query OpenWeatherMap directly
    Weather {
        #[command(subcommand)]
        action: WeatherAction,
    },

    /// Check API keys and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum WeatherAction {
    /// Current weather for a city
    Current {
        city: String,

        /// Two-letter country code
        #[arg(long)]
        country: Option<String>,

        /// Resolve the city through geocoding and query by coordinates
        #[arg(long)]
        geocode: bool,
    },

    /// Current weather at coordinates
    Coords {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// 3-hourly forecast for a city
    Forecast {
        city: String,

        /// Two-letter country code
        #[arg(long)]
        country: Option<String>,

        /// Number of 3-hour periods
        #[arg(short, long, default_value = "8")]
        periods: usize,
    },

    /// Resolve a place name to coordinates
    Geocode {
        query: String,

        /// Maximum number of matches
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Also show current weather for each match
        #[arg(short, long)]
        weather: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (secrets redacted)
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
