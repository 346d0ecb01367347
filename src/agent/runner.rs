//! Agent runner with tool calling loop.

use super::events::{AgentEvent, ToolCallRecord};
use super::tools::{ToolContext, ToolSet};
use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::error::{BreezeError, Result};
use crate::model::{
    ChatMessage, CompletionBuilder, CompletionRequest, ModelClient, ToolCallRequest, Usage,
};
use crate::task::Task;
use crate::weather::WeatherProvider;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Agent that carries a task to completion, calling tools along the way.
pub struct Agent {
    client: Arc<dyn ModelClient>,
    name: String,
    description: Option<String>,
    system_prompt: String,
    tools: ToolSet,
    context: ToolContext,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent on top of a (possibly shared) model client.
    ///
    /// Nothing is sent to the model until the first task runs.
    pub fn new(client: Arc<dyn ModelClient>, name: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
            description: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tools: ToolSet::new(),
            context: ToolContext::new(),
            max_iterations: 10,
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set a description of what the agent is for.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Register tools.
    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    /// Attach a weather provider for the weather tools.
    pub fn with_weather(
        mut self,
        provider: Arc<dyn WeatherProvider>,
        default_country: Option<String>,
    ) -> Self {
        self.context = self.context.with_weather(provider, default_country);
        self
    }

    /// Set the context tools execute in.
    pub fn with_tool_context(mut self, context: ToolContext) -> Self {
        self.context = context;
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Run a task to completion.
    pub async fn run(&self, task: impl Into<Task>) -> Result<TaskResult> {
        let task = task.into();
        let mut result = TaskResult::new(task.clone());

        let mut events = self.drive(task, false);
        while let Some(event) = events.next().await {
            result.record(event?);
        }

        if !result.is_complete() {
            return Err(BreezeError::Agent(
                "Agent stopped without a final message".to_string(),
            ));
        }
        Ok(result)
    }

    /// Run a task, yielding events as they happen.
    ///
    /// The stream ends after the final message, or after the first error.
    pub fn run_stream(&self, task: impl Into<Task>) -> BoxStream<'_, Result<AgentEvent>> {
        self.drive(task.into(), true)
    }

    fn check_capabilities(&self, task: &Task) -> Result<()> {
        let Some(info) = self.client.info() else {
            return Ok(());
        };
        if task.has_images() && !info.vision {
            return Err(BreezeError::Unsupported(format!(
                "{} does not accept images",
                self.client.model()
            )));
        }
        if !self.tools.is_empty() && !info.function_calling {
            return Err(BreezeError::Unsupported(format!(
                "{} does not support function calling",
                self.client.model()
            )));
        }
        Ok(())
    }

    fn drive(&self, task: Task, streaming: bool) -> BoxStream<'_, Result<AgentEvent>> {
        Box::pin(async_stream::try_stream! {
            self.check_capabilities(&task)?;

            let run_id = Uuid::new_v4();
            info!(%run_id, agent = %self.name, streaming, "Running task");

            let tools = self.tools.schemas();
            let mut messages = vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(task),
            ];
            let mut iterations = 0;

            loop {
                iterations += 1;
                if iterations > self.max_iterations {
                    Err::<(), _>(BreezeError::Agent(format!(
                        "Agent exceeded maximum iterations ({})",
                        self.max_iterations
                    )))?;
                }

                debug!(%run_id, "Agent iteration {}", iterations);

                let request = CompletionRequest {
                    messages: messages.clone(),
                    tools: tools.clone(),
                };

                let completion = if streaming {
                    let mut deltas = self.client.complete_stream(request).await?;
                    let mut builder = CompletionBuilder::default();
                    while let Some(delta) = deltas.next().await {
                        let delta = delta?;
                        if let Some(text) = delta.content.as_ref().filter(|t| !t.is_empty()) {
                            yield AgentEvent::PartialOutput {
                                source: self.name.clone(),
                                text: text.clone(),
                            };
                        }
                        builder.push(delta);
                    }
                    builder.finish()
                } else {
                    self.client.complete(request).await?
                };

                if completion.tool_calls.is_empty() {
                    info!(%run_id, "Task finished after {} iteration(s)", iterations);
                    yield AgentEvent::FinalMessage {
                        source: self.name.clone(),
                        content: completion.content.unwrap_or_default(),
                        usage: completion.usage,
                    };
                    break;
                }

                yield AgentEvent::ToolCallRequest {
                    source: self.name.clone(),
                    content: completion.content.clone(),
                    calls: completion.tool_calls.clone(),
                    usage: completion.usage,
                };

                messages.push(ChatMessage::Assistant {
                    content: completion.content.clone(),
                    tool_calls: completion.tool_calls.clone(),
                });

                let mut results = Vec::with_capacity(completion.tool_calls.len());
                for call in &completion.tool_calls {
                    let record = self.execute_tool_call(call).await;
                    messages.push(ChatMessage::tool(call.id.clone(), record.result.clone()));
                    results.push(record);
                }

                yield AgentEvent::ToolCallExecution {
                    source: self.name.clone(),
                    results,
                };
            }
        })
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Failures become the recorded result text; they never abort the run.
    async fn execute_tool_call(&self, call: &ToolCallRequest) -> ToolCallRecord {
        info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

        let (result, is_error) = match self.tools.resolve(&call.name, &call.arguments) {
            Ok(tool) => match self.context.execute(&tool).await {
                Ok(output) => (output, false),
                Err(e) => (format!("Tool error: {}", e), true),
            },
            Err(e) => (format!("Tool error: {}", e), true),
        };

        if is_error {
            debug!("Tool {} failed: {}", call.name, result);
        }

        ToolCallRecord {
            call_id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
            is_error,
        }
    }
}

/// Result of running a task.
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Conversation for this task: the user's task first, the final answer last.
    pub messages: Vec<ChatMessage>,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Token usage summed over all model responses.
    pub usage: Usage,
    /// Number of model round trips.
    pub iterations: usize,
    complete: bool,
}

impl TaskResult {
    fn new(task: Task) -> Self {
        Self {
            messages: vec![ChatMessage::user(task)],
            tool_calls: Vec::new(),
            usage: Usage::default(),
            iterations: 0,
            complete: false,
        }
    }

    fn record(&mut self, event: AgentEvent) {
        if let Some(usage) = event.usage() {
            self.usage.accumulate(usage);
        }
        match event {
            AgentEvent::ToolCallRequest { content, calls, .. } => {
                self.iterations += 1;
                self.messages.push(ChatMessage::Assistant {
                    content,
                    tool_calls: calls,
                });
            }
            AgentEvent::ToolCallExecution { results, .. } => {
                for record in results {
                    self.messages
                        .push(ChatMessage::tool(record.call_id.clone(), record.result.clone()));
                    self.tool_calls.push(record);
                }
            }
            AgentEvent::PartialOutput { .. } => {}
            AgentEvent::FinalMessage { content, .. } => {
                self.iterations += 1;
                self.messages.push(ChatMessage::assistant(content));
                self.complete = true;
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    /// The last message of the conversation.
    pub fn final_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Content of the final answer.
    pub fn final_content(&self) -> &str {
        self.final_message()
            .and_then(ChatMessage::content)
            .unwrap_or_default()
    }
}
