//! Breeze - tool-using chat agents
//!
//! A small agent runtime: a model answers a task in a single turn, calling
//! tools such as live weather lookups or integer addition along the way.
//!
//! # Overview
//!
//! Breeze allows you to:
//! - Run a task against an OpenAI-compatible model (OpenAI, OpenRouter)
//! - Attach images to a task for vision-capable models
//! - Let the model call weather and arithmetic tools
//! - Stream every step of the run as typed events, with token statistics
//!
//! # Architecture
//!
//! - `config` - Settings file and environment overlay
//! - `model` - Model client abstraction and the OpenAI-compatible client
//! - `agent` - Agent loop, tools, events, and weather prefetch
//! - `weather` - OpenWeatherMap client
//! - `orchestrator` - Wiring agents from settings
//!
//! # Example
//!
//! ```rust,no_run
//! use breeze::agent::{ToolKind, ToolSet};
//! use breeze::config::Settings;
//! use breeze::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut settings = Settings::load()?;
//!     settings.apply_env();
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let agent = orchestrator.agent(ToolSet::new().with(ToolKind::AddNumbers))?;
//!     let result = agent.run("What is the sum of 2 and 3?").await?;
//!     println!("{}", result.final_content());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod openai;
pub mod orchestrator;
pub mod task;
pub mod weather;

pub use error::{BreezeError, Result};
