//! Generation requests and the chat-completion body they turn into.

use crate::ConfigError;
use crate::model::{ModelId, default_model};
use crate::wire::WireFormat;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 64_000;

/// Caller-supplied knobs. Anything left `None` takes the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub model: Option<ModelId>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
}

/// A fully resolved, validated request. Built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    model: ModelId,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

impl GenerationRequest {
    /// Fill in defaults and validate.
    ///
    /// The prompt is only checked for presence; it is sent exactly as given.
    pub fn build(
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> Result<Self, ConfigError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ConfigError::EmptyPrompt);
        }

        let temperature = options.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "temperature".into(),
                message: format!("{temperature} is outside [0, 2]"),
            });
        }

        let max_tokens = options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_tokens".into(),
                message: "must be positive".into(),
            });
        }

        Ok(Self {
            prompt,
            model: options.model.unwrap_or_else(default_model),
            temperature,
            max_tokens,
            stream: options.stream.unwrap_or(false),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn stream(&self) -> bool {
        self.stream
    }
}

/// A single chat message in the outbound body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of a chat-completion POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: ModelId,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatCompletionRequest {
    /// Map a generation request onto the provider's message layout.
    pub fn from_generation(request: &GenerationRequest, wire: &WireFormat) -> Self {
        let mut messages = vec![ChatMessage {
            role: wire.prompt_role.clone(),
            content: request.prompt.clone(),
        }];
        // An empty placeholder disables it, since TOML cannot express null
        if let Some(placeholder) = wire
            .placeholder_user_message
            .as_deref()
            .filter(|p| !p.is_empty())
        {
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: placeholder.to_string(),
            });
        }

        Self {
            model: request.model.clone(),
            messages,
            stream: request.stream,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}
