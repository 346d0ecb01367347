//! Chat-completion client backed by async-openai.

use super::{
    ChatMessage, Completion, CompletionDelta, CompletionRequest, ModelClient, ModelInfo,
    ToolCallDelta, ToolCallRequest, ToolSchema, Usage,
};
use crate::config::ModelSettings;
use crate::error::{BreezeError, Result};
use crate::openai::create_client;
use crate::task::Task;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContentPart, ChatCompletionStreamOptions, ChatCompletionTool,
    ChatCompletionToolType, CompletionUsage, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObject, ImageUrlArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, instrument};

/// Model client for OpenAI and OpenAI-compatible endpoints.
pub struct OpenAIModelClient {
    client: Client<OpenAIConfig>,
    model: String,
    info: Option<ModelInfo>,
}

impl OpenAIModelClient {
    /// Create a client from model settings.
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.name.clone(),
            info: settings.info.clone(),
        })
    }

    /// Wrap an existing async-openai client.
    pub fn with_client(client: Client<OpenAIConfig>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            info: None,
        }
    }

    /// Attach a capability descriptor.
    pub fn with_info(mut self, info: ModelInfo) -> Self {
        self.info = Some(info);
        self
    }

    fn build_request(
        &self,
        request: CompletionRequest,
        stream: bool,
    ) -> Result<CreateChatCompletionRequest> {
        let messages = request
            .messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages);

        // An empty tools array is rejected by the API.
        if !request.tools.is_empty() {
            args.tools(request.tools.iter().map(to_openai_tool).collect::<Vec<_>>());
        }
        if stream {
            args.stream(true)
                .stream_options(ChatCompletionStreamOptions { include_usage: true });
        }

        args.build().map_err(|e| BreezeError::Agent(e.to_string()))
    }
}

#[async_trait]
impl ModelClient for OpenAIModelClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn info(&self) -> Option<&ModelInfo> {
        self.info.as_ref()
    }

    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let request = self.build_request(request, false)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| BreezeError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let usage = response.usage.as_ref().map(to_usage);
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BreezeError::Agent("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect::<Vec<_>>();

        debug!("Model returned {} tool call(s)", tool_calls.len());

        Ok(Completion {
            content: choice.message.content,
            tool_calls,
            usage,
        })
    }

    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionDelta>>> {
        let request = self.build_request(request, true)?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| BreezeError::OpenAI(format!("Chat completion stream failed: {}", e)))?;

        Ok(stream
            .map(|chunk| {
                let chunk = chunk
                    .map_err(|e| BreezeError::OpenAI(format!("Stream error: {}", e)))?;
                let mut delta = CompletionDelta {
                    usage: chunk.usage.as_ref().map(to_usage),
                    ..Default::default()
                };
                if let Some(choice) = chunk.choices.into_iter().next() {
                    delta.content = choice.delta.content;
                    delta.tool_calls = choice
                        .delta
                        .tool_calls
                        .unwrap_or_default()
                        .into_iter()
                        .map(|fragment| {
                            let (name, arguments) = match fragment.function {
                                Some(f) => (f.name, f.arguments),
                                None => (None, None),
                            };
                            ToolCallDelta {
                                index: fragment.index,
                                id: fragment.id,
                                name,
                                arguments,
                            }
                        })
                        .collect();
                }
                Ok(delta)
            })
            .boxed())
    }
}

fn to_usage(usage: &CompletionUsage) -> Usage {
    Usage::new(usage.prompt_tokens, usage.completion_tokens)
}

fn to_openai_tool(schema: &ToolSchema) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: schema.name.clone(),
            description: Some(schema.description.clone()),
            parameters: Some(schema.parameters.clone()),
            strict: None,
        },
    }
}

fn to_openai_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ChatMessage::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(|e| BreezeError::Agent(e.to_string()))?
            .into(),

        ChatMessage::User { task } => match task {
            Task::Text(text) => ChatCompletionRequestUserMessageArgs::default()
                .content(text.clone())
                .build()
                .map_err(|e| BreezeError::Agent(e.to_string()))?
                .into(),
            Task::MultiModal(multimodal) => {
                let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
                    ChatCompletionRequestMessageContentPartTextArgs::default()
                        .text(multimodal.text.clone())
                        .build()
                        .map_err(|e| BreezeError::Agent(e.to_string()))?
                        .into(),
                ];
                for image in &multimodal.images {
                    let image_url = ImageUrlArgs::default()
                        .url(image.to_url())
                        .build()
                        .map_err(|e| BreezeError::Agent(e.to_string()))?;
                    parts.push(
                        ChatCompletionRequestMessageContentPartImageArgs::default()
                            .image_url(image_url)
                            .build()
                            .map_err(|e| BreezeError::Agent(e.to_string()))?
                            .into(),
                    );
                }
                ChatCompletionRequestUserMessageArgs::default()
                    .content(parts)
                    .build()
                    .map_err(|e| BreezeError::Agent(e.to_string()))?
                    .into()
            }
        },

        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = content {
                args.content(text.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build()
                .map_err(|e| BreezeError::Agent(e.to_string()))?
                .into()
        }

        ChatMessage::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(|e| BreezeError::Agent(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompletionBuilder;
    use crate::task::Image;
    use mockito::Matcher;

    fn mock_client(server: &mockito::Server) -> OpenAIModelClient {
        let config = OpenAIConfig::new()
            .with_api_key("k")
            .with_api_base(server.url());
        OpenAIModelClient::with_client(Client::with_config(config), "gpt-4o-mini")
    }

    fn adder_request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::user("What is the sum of 2 and 3?")],
            tools: vec![ToolSchema {
                name: "add_numbers".to_string(),
                description: "Add two integers".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }],
        }
    }

    fn client() -> OpenAIModelClient {
        OpenAIModelClient::new(&ModelSettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_without_tools_omits_tools() {
        let request = client()
            .build_request(
                CompletionRequest {
                    messages: vec![
                        ChatMessage::system("You are helpful"),
                        ChatMessage::user("tell me a joke"),
                    ],
                    tools: Vec::new(),
                },
                false,
            )
            .unwrap();

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert!(request.tools.is_none());
        assert!(request.stream.is_none());
    }

    #[test]
    fn test_request_serializes_tool_round_trip_history() {
        let call = ToolCallRequest {
            id: "call_1".to_string(),
            name: "add_numbers".to_string(),
            arguments: r#"{"a":2,"b":3}"#.to_string(),
        };
        let request = client()
            .build_request(
                CompletionRequest {
                    messages: vec![
                        ChatMessage::user("What is the sum of 2 and 3?"),
                        ChatMessage::Assistant {
                            content: None,
                            tool_calls: vec![call],
                        },
                        ChatMessage::tool("call_1", "The sum of 2 and 3 is 5"),
                    ],
                    tools: vec![ToolSchema {
                        name: "add_numbers".to_string(),
                        description: "Add two integers".to_string(),
                        parameters: serde_json::json!({"type": "object"}),
                    }],
                },
                true,
            )
            .unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][1]["tool_calls"][0]["function"]["name"], "add_numbers");
        assert_eq!(json["messages"][2]["role"], "tool");
        assert_eq!(json["messages"][2]["tool_call_id"], "call_1");
        assert_eq!(json["tools"][0]["function"]["name"], "add_numbers");
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn test_multimodal_message_parts() {
        let task = Task::multimodal(
            "What is in this image?",
            vec![Image::Url("https://picsum.photos/id/237/200/300".to_string())],
        );
        let message = to_openai_message(&ChatMessage::user(task)).unwrap();
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "https://picsum.photos/id/237/200/300"
        );
    }

    #[tokio::test]
    async fn test_complete_reads_tool_calls_and_usage() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({"model": "gpt-4o-mini"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "Let me add those.",
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "add_numbers", "arguments": "{\"a\":2,\"b\":3}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 80, "completion_tokens": 20, "total_tokens": 100}
            }"#,
            )
            .create_async()
            .await;

        let completion = mock_client(&server).complete(adder_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(completion.content.as_deref(), Some("Let me add those."));
        assert_eq!(
            completion.tool_calls,
            vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "add_numbers".to_string(),
                arguments: r#"{"a":2,"b":3}"#.to_string(),
            }]
        );
        assert_eq!(completion.usage, Some(Usage::new(80, 20)));
    }

    #[tokio::test]
    async fn test_complete_stream_joins_argument_fragments() {
        let chunk = |choices: serde_json::Value, usage: serde_json::Value| {
            format!(
                "data: {}\n\n",
                serde_json::json!({
                    "id": "chatcmpl-2",
                    "object": "chat.completion.chunk",
                    "created": 1700000000,
                    "model": "gpt-4o-mini",
                    "choices": choices,
                    "usage": usage,
                })
            )
        };
        let body = [
            chunk(
                serde_json::json!([{"index": 0, "delta": {"role": "assistant", "tool_calls": [
                    {"index": 0, "id": "call_1", "type": "function",
                     "function": {"name": "add_numbers", "arguments": "{\"a\":2,"}}
                ]}}]),
                serde_json::Value::Null,
            ),
            chunk(
                serde_json::json!([{"index": 0, "delta": {"tool_calls": [
                    {"index": 0, "function": {"arguments": "\"b\":3}"}}
                ]}, "finish_reason": "tool_calls"}]),
                serde_json::Value::Null,
            ),
            chunk(
                serde_json::json!([]),
                serde_json::json!({"prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60}),
            ),
            "data: [DONE]\n\n".to_string(),
        ]
        .concat();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "stream": true,
                "stream_options": {"include_usage": true}
            })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let deltas: Vec<CompletionDelta> = mock_client(&server)
            .complete_stream(adder_request())
            .await
            .unwrap()
            .map(|delta| delta.unwrap())
            .collect()
            .await;

        assert_eq!(deltas.len(), 3);
        assert!(deltas[2].tool_calls.is_empty());
        assert_eq!(deltas[2].usage, Some(Usage::new(50, 10)));

        let mut builder = CompletionBuilder::default();
        for delta in deltas {
            builder.push(delta);
        }
        let completion = builder.finish();
        assert!(completion.content.is_none());
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].id, "call_1");
        assert_eq!(completion.tool_calls[0].name, "add_numbers");
        assert_eq!(completion.tool_calls[0].arguments, r#"{"a":2,"b":3}"#);
        assert_eq!(completion.usage, Some(Usage::new(50, 10)));
    }
}
