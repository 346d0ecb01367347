//! CLI output formatting utilities.

use crate::agent::{AgentEvent, EventStats, ToolCallRecord};
use crate::model::Usage;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a tool call and its result.
    pub fn tool_call(record: &ToolCallRecord, detailed: bool) {
        let marker = if record.is_error {
            style("!").red()
        } else {
            style("*").cyan()
        };
        let (args, result) = if detailed {
            (record.arguments.clone(), record.result.clone())
        } else {
            (truncate(&record.arguments, 60), truncate(&record.result, 80))
        };
        println!("  {} {}({})", marker, style(&record.name).bold(), args);
        println!("    {} {}", style("->").dim(), result);
    }

    /// Print one agent event as observed in a stream.
    ///
    /// `streamed` is the text already printed from partial output in the
    /// current turn.
    pub fn event(index: usize, event: &AgentEvent, detailed: bool, streamed: &str) {
        let label = style(format!("[{}] {}", index, event.kind())).magenta().bold();
        match event {
            AgentEvent::ToolCallRequest {
                content,
                calls,
                usage,
                ..
            } => {
                println!("\n{} {}", label, usage_suffix(usage.as_ref()));
                if let Some(text) = content.as_deref().and_then(|c| message_body(c, streamed, detailed)) {
                    println!("  {}", style(text).italic());
                }
                for call in calls {
                    let args = if detailed {
                        call.arguments.clone()
                    } else {
                        truncate(&call.arguments, 60)
                    };
                    println!("  {} {}({})", style("?").yellow(), style(&call.name).bold(), args);
                }
            }
            AgentEvent::ToolCallExecution { results, .. } => {
                println!("\n{}", label);
                for record in results {
                    Self::tool_call(record, detailed);
                }
            }
            AgentEvent::PartialOutput { text, .. } => {
                if detailed {
                    println!("{} {:?}", style(format!("[{}]", index)).dim(), text);
                } else {
                    print!("{}", text);
                    let _ = std::io::stdout().flush();
                }
            }
            AgentEvent::FinalMessage { content, usage, .. } => {
                println!("\n{} {}", label, usage_suffix(usage.as_ref()));
                if let Some(text) = message_body(content, streamed, detailed) {
                    println!("{}", text);
                }
            }
        }
    }

    /// Print statistics for a finished stream.
    pub fn event_stats(stats: &EventStats, elapsed: Duration) {
        Self::header("Summary");
        Self::kv("Events", &stats.total_events().to_string());
        for (kind, count) in stats.breakdown() {
            Self::kv(&format!("  {}", kind), &count.to_string());
        }
        let usage = stats.usage();
        Self::kv(
            "Tokens",
            &format!(
                "{} ({} prompt, {} completion)",
                usage.total(),
                usage.prompt_tokens,
                usage.completion_tokens
            ),
        );
        Self::kv("Elapsed", &format!("{:.2}s", elapsed.as_secs_f64()));
        if let Some(avg) = stats.average_per_event(elapsed) {
            Self::kv("Per event", &format!("{:.0}ms", avg.as_secs_f64() * 1000.0));
        }
        if let Some(rate) = stats.events_per_second(elapsed) {
            Self::kv("Events/s", &format!("{:.1}", rate));
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

fn usage_suffix(usage: Option<&Usage>) -> String {
    match usage {
        Some(u) => style(format!("({} tokens)", u.total())).dim().to_string(),
        None => String::new(),
    }
}

/// Message text still to print, or `None` when partial output already showed it.
fn message_body<'a>(content: &'a str, streamed: &str, detailed: bool) -> Option<&'a str> {
    if content.is_empty() || (!detailed && !streamed.is_empty()) {
        None
    } else {
        Some(content)
    }
}

/// Truncate content with ellipsis.
pub(crate) fn truncate(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
