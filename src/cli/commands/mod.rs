//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod observe;
mod weather;
mod weather_chat;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use observe::run_observe;
pub use weather::run_weather;
pub use weather_chat::run_weather_chat;

use crate::agent::{ToolKind, ToolSet};
use crate::config::Settings;

/// Parse `--tool` values into a tool set.
fn parse_tools(names: &[String]) -> anyhow::Result<ToolSet> {
    let kinds = names
        .iter()
        .map(|n| n.parse::<ToolKind>().map_err(anyhow::Error::msg))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(ToolSet::from_kinds(kinds))
}

/// Apply `--model` and `--system` overrides.
fn apply_overrides(settings: &mut Settings, model: Option<String>, system: Option<String>) {
    if let Some(model) = model {
        settings.model.name = model;
    }
    if let Some(system) = system {
        settings.agent.system_prompt = system;
    }
}
