//! Agent system for task execution with tool calling.
//!
//! An [`Agent`] sends a task to a model, runs any tools the model asks
//! for, and reports each step as an [`AgentEvent`].

pub mod briefing;
mod events;
mod runner;
mod tools;

pub use briefing::{extract_city, mentions_weather, prepare_task, Briefing};
pub use events::{AgentEvent, EventKind, EventStats, ToolCallRecord};
pub use runner::{Agent, TaskResult};
pub use tools::{lookup_failed, parse_tool_call, ToolCall, ToolContext, ToolKind, ToolSet};
