//! Provider-specific framing and field locations.
//!
//! Everything that differs between OpenAI-compatible endpoints lives here so
//! that another provider is a configuration change rather than a code change.

use serde::{Deserialize, Serialize};

/// Gemini's OpenAI-compatible chat-completion endpoint.
pub const DEFAULT_ENDPOINT_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// How requests are shaped and how responses are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireFormat {
    /// Prefix marking a meaningful line of the event stream.
    pub event_prefix: String,
    /// Payload that ends the event stream.
    pub done_sentinel: String,
    /// JSON pointer to the text of a buffered response.
    pub message_content_pointer: String,
    /// JSON pointer to the text fragment of one streamed event.
    pub delta_content_pointer: String,
    /// Role the prompt text is sent under.
    pub prompt_role: String,
    /// Constant user message sent after the prompt, if any.
    pub placeholder_user_message: Option<String>,
}

impl Default for WireFormat {
    fn default() -> Self {
        Self {
            event_prefix: "data:".to_string(),
            done_sentinel: "[DONE]".to_string(),
            message_content_pointer: "/choices/0/message/content".to_string(),
            delta_content_pointer: "/choices/0/delta/content".to_string(),
            prompt_role: "system".to_string(),
            placeholder_user_message: Some("none".to_string()),
        }
    }
}
