//! Observe command: stream an agent run and print every event.

use super::{apply_overrides, parse_tools};
use crate::agent::{AgentEvent, EventStats};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use futures::StreamExt;
use std::time::Instant;

/// Run the observe command.
pub async fn run_observe(
    task: &str,
    tools: &[String],
    model: Option<String>,
    detailed: bool,
    mut settings: Settings,
) -> Result<()> {
    let tools = parse_tools(tools)?;
    apply_overrides(&mut settings, model, None);

    if let Err(e) = preflight::check(Operation::Agent(&tools), &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'breeze doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let agent = orchestrator.agent(tools)?;

    Output::header(&format!("Task: {}", task));

    let start = Instant::now();
    let mut stats = EventStats::new();
    let mut streamed = String::new();
    let mut events = agent.run_stream(task);

    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                println!();
                Output::error(&format!("Agent failed: {}", e));
                return Err(e.into());
            }
        };
        stats.observe(&event);
        Output::event(stats.total_events(), &event, detailed, &streamed);
        match &event {
            AgentEvent::PartialOutput { text, .. } => streamed.push_str(text),
            _ => streamed.clear(),
        }
    }

    Output::event_stats(&stats, start.elapsed());
    Ok(())
}
