//! Provider-neutral chat types.

use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One message in a conversation with the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        task: Task,
    },
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(task: impl Into<Task>) -> Self {
        ChatMessage::User { task: task.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage::Tool {
            call_id: call_id.into(),
            content: content.into(),
        }
    }

    /// Text content of the message, if it has any.
    pub fn content(&self) -> Option<&str> {
        match self {
            ChatMessage::System { content } | ChatMessage::Tool { content, .. } => Some(content),
            ChatMessage::User { task } => Some(task.text()),
            ChatMessage::Assistant { content, .. } => content.as_deref(),
        }
    }

    /// Role name as used by chat-completion APIs.
    pub fn role(&self) -> &'static str {
        match self {
            ChatMessage::System { .. } => "system",
            ChatMessage::User { .. } => "user",
            ChatMessage::Assistant { .. } => "assistant",
            ChatMessage::Tool { .. } => "tool",
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

impl std::fmt::Display for ToolCallRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Function schema advertised to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the arguments.
    pub parameters: serde_json::Value,
}

/// Token usage reported for one model response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.prompt_tokens) + u64::from(self.completion_tokens)
    }

    /// Add another usage record, saturating at the counter limits.
    pub fn accumulate(&mut self, other: &Usage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
    }
}

/// Everything the model needs for one round trip.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSchema>,
}

/// A complete model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Option<Usage>,
}

impl Completion {
    /// A plain text answer with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A response asking for tool calls.
    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Express this completion as a single streamed delta.
    pub fn into_delta(self) -> CompletionDelta {
        CompletionDelta {
            content: self.content,
            tool_calls: self
                .tool_calls
                .into_iter()
                .enumerate()
                .map(|(index, call)| ToolCallDelta {
                    index: index as u32,
                    id: Some(call.id),
                    name: Some(call.name),
                    arguments: Some(call.arguments),
                })
                .collect(),
            usage: self.usage,
        }
    }
}

/// Incremental piece of a streamed model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionDelta {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallDelta>,
    pub usage: Option<Usage>,
}

/// Fragment of a tool call. Fragments sharing an index belong to one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallDelta {
    pub index: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: Option<String>,
}

/// Folds streamed deltas back into a [`Completion`].
#[derive(Debug, Default)]
pub struct CompletionBuilder {
    content: Option<String>,
    calls: BTreeMap<u32, ToolCallRequest>,
    usage: Option<Usage>,
}

impl CompletionBuilder {
    pub fn push(&mut self, delta: CompletionDelta) {
        if let Some(text) = delta.content {
            self.content.get_or_insert_with(String::new).push_str(&text);
        }

        for fragment in delta.tool_calls {
            let call = self
                .calls
                .entry(fragment.index)
                .or_insert_with(|| ToolCallRequest {
                    id: String::new(),
                    name: String::new(),
                    arguments: String::new(),
                });
            if let Some(id) = fragment.id {
                call.id = id;
            }
            if let Some(name) = fragment.name {
                call.name.push_str(&name);
            }
            if let Some(arguments) = fragment.arguments {
                call.arguments.push_str(&arguments);
            }
        }

        if let Some(usage) = delta.usage {
            self.usage.get_or_insert_with(Usage::default).accumulate(&usage);
        }
    }

    pub fn finish(self) -> Completion {
        Completion {
            content: self.content,
            tool_calls: self.calls.into_values().collect(),
            usage: self.usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_merges_fragments() {
        let mut builder = CompletionBuilder::default();
        builder.push(CompletionDelta {
            tool_calls: vec![ToolCallDelta {
                index: 0,
                id: Some("call_1".to_string()),
                name: Some("add_numbers".to_string()),
                arguments: Some(r#"{"a": 2,"#.to_string()),
            }],
            ..Default::default()
        });
        builder.push(CompletionDelta {
            tool_calls: vec![ToolCallDelta {
                index: 0,
                arguments: Some(r#" "b": 3}"#.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        builder.push(CompletionDelta {
            usage: Some(Usage::new(40, 12)),
            ..Default::default()
        });

        let completion = builder.finish();
        assert!(completion.content.is_none());
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].id, "call_1");
        assert_eq!(completion.tool_calls[0].arguments, r#"{"a": 2, "b": 3}"#);
        assert_eq!(completion.usage, Some(Usage::new(40, 12)));
    }

    #[test]
    fn test_builder_concatenates_text() {
        let mut builder = CompletionBuilder::default();
        for piece in ["Why did ", "the chicken ", "cross?"] {
            builder.push(CompletionDelta {
                content: Some(piece.to_string()),
                ..Default::default()
            });
        }
        let completion = builder.finish();
        assert_eq!(completion.content.as_deref(), Some("Why did the chicken cross?"));
        assert!(completion.usage.is_none());
    }

    #[test]
    fn test_usage_saturates() {
        let mut usage = Usage::new(u32::MAX, 1);
        usage.accumulate(&Usage::new(5, 2));
        assert_eq!(usage.prompt_tokens, u32::MAX);
        assert_eq!(usage.completion_tokens, 3);
        assert_eq!(usage.total(), u64::from(u32::MAX) + 3);
    }
}
