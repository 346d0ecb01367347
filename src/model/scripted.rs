//! Scripted model client for tests and offline runs.

use super::{Completion, CompletionDelta, CompletionRequest, ModelClient, ModelInfo};
use crate::error::{BreezeError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Mutex;

/// A model client that replays pre-configured completions in order.
///
/// Every request is recorded so tests can inspect what the agent sent.
/// Streaming splits text content into word-sized deltas.
pub struct ScriptedModelClient {
    model: String,
    info: Option<ModelInfo>,
    responses: Mutex<Vec<Completion>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModelClient {
    /// Create a client with a sequence of responses.
    pub fn new(responses: Vec<Completion>) -> Self {
        Self {
            model: "scripted".to_string(),
            info: None,
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_info(mut self, info: ModelInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn next_response(&self, request: CompletionRequest) -> Result<Completion> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| BreezeError::Agent("Scripted client poisoned".to_string()))?;
        if responses.is_empty() {
            return Err(BreezeError::OpenAI("No scripted response left".to_string()));
        }
        Ok(responses.remove(0))
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn info(&self) -> Option<&ModelInfo> {
        self.info.as_ref()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        self.next_response(request)
    }

    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionDelta>>> {
        let completion = self.next_response(request)?;

        let mut deltas: Vec<CompletionDelta> = completion
            .content
            .as_deref()
            .map(|text| {
                text.split_inclusive(' ')
                    .map(|word| CompletionDelta {
                        content: Some(word.to_string()),
                        ..Default::default()
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Tool calls and usage arrive in the closing delta.
        deltas.push(
            Completion {
                content: None,
                ..completion
            }
            .into_delta(),
        );

        Ok(Box::pin(futures::stream::iter(deltas.into_iter().map(Ok))))
    }
}
