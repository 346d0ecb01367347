//! Breeze CLI entry point.

use anyhow::Result;
use breeze::cli::{commands, Cli, Commands};
use breeze::config::{load_dotenv, Settings};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let mut settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("breeze={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Environment overrides, .env first
    let env_file = settings.general.env_file.as_deref().map(Settings::expand_path);
    load_dotenv(env_file.as_deref());
    settings.apply_env();

    // Execute command
    match cli.command {
        Commands::Ask {
            task,
            image,
            tool,
            model,
            system,
        } => {
            commands::run_ask(&task, &image, &tool, model, system, settings).await?;
        }

        Commands::Observe {
            task,
            tool,
            model,
            detailed,
        } => {
            commands::run_observe(&task, &tool, model, detailed, settings).await?;
        }

        Commands::WeatherChat { question, country } => {
            commands::run_weather_chat(&question, country, settings).await?;
        }

        Commands::Weather { action } => {
            commands::run_weather(&action, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
