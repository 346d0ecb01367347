//! Model client abstraction.
//!
//! The agent talks to the model only through [`ModelClient`]: send the
//! conversation so far plus the available tool schemas, receive text and/or
//! tool-call requests.

mod info;
mod openai;
mod scripted;
mod types;

pub use info::ModelInfo;
pub use openai::OpenAIModelClient;
pub use scripted::ScriptedModelClient;
pub use types::{
    ChatMessage, Completion, CompletionBuilder, CompletionDelta, CompletionRequest,
    ToolCallDelta, ToolCallRequest, ToolSchema, Usage,
};

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Trait for chat-completion backends.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Capability descriptor, when one was supplied.
    fn info(&self) -> Option<&ModelInfo> {
        None
    }

    /// Generate one complete response.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;

    /// Generate one response as a stream of deltas.
    ///
    /// The default implementation performs a regular completion and yields it
    /// as a single delta.
    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionDelta>>> {
        let completion = self.complete(request).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok(completion.into_delta())
        })))
    }
}
