//! Ask command implementation.

use super::{apply_overrides, parse_tools};
use crate::cli::output::truncate;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::task::{Image, Task};
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    task: &str,
    images: &[String],
    tools: &[String],
    model: Option<String>,
    system: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    let tools = parse_tools(tools)?;
    apply_overrides(&mut settings, model, system);

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Agent(&tools), &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'breeze doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let images = images
        .iter()
        .map(|location| Image::from_location(location))
        .collect::<crate::Result<Vec<_>>>()?;
    let task = if images.is_empty() {
        Task::from(task)
    } else {
        Task::multimodal(task, images)
    };

    let orchestrator = Orchestrator::new(settings)?;
    let agent = orchestrator.agent(tools)?;

    let spinner = Output::spinner("Agent working...");

    match agent.run(task).await {
        Ok(result) => {
            spinner.finish_and_clear();

            println!("\n{}\n", result.final_content());

            if !result.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", result.tool_calls.len()));
                for call in &result.tool_calls {
                    Output::info(&format!("  {} {}", call.name, truncate(&call.arguments, 60)));
                }
                println!();
            }

            Output::info(&format!(
                "Completed in {} iteration(s), {} tokens",
                result.iterations,
                result.usage.total()
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
