//! Model capability descriptor.

use serde::{Deserialize, Serialize};

/// Capabilities of a model served behind an OpenAI-compatible endpoint.
///
/// Needed for models the client cannot infer anything about, e.g. models
/// routed through OpenRouter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    pub family: String,
    pub provider: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub vision: bool,
    pub function_calling: bool,
    pub json_output: bool,
    pub structured_output: bool,
    pub context_length: u32,
    pub max_tokens: u32,
    pub supported_features: Vec<String>,
}

impl ModelInfo {
    /// DeepSeek chat v3.1 as served by OpenRouter.
    pub fn deepseek_openrouter() -> Self {
        Self {
            family: "deepseek".to_string(),
            provider: "openrouter/openrouter".to_string(),
            model_type: "chat".to_string(),
            vision: true,
            function_calling: true,
            json_output: true,
            structured_output: true,
            context_length: 8192,
            max_tokens: 4096,
            supported_features: vec![
                "chat".to_string(),
                "vision".to_string(),
                "function_calling".to_string(),
            ],
        }
    }
}
