//! Error hierarchy for Inkwell.

use thiserror::Error;

/// Longest slice of an error body rendered by `Display`.
const BODY_PREVIEW_BYTES: usize = 512;

/// Longest prefix of `text` within `max_bytes` that ends on a char boundary.
///
/// Used when echoing provider bodies and stream payloads into logs and errors.
pub fn preview(text: &str, max_bytes: usize) -> &str {
    let end = text
        .char_indices()
        .map(|(start, c)| start + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &text[..end]
}

/// Top-level error returned by a generation request.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No API key available (set INKWELL_API_KEY or add api_key to ~/.inkwell/config.toml)")]
    MissingCredential,

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Errors from the chat-completion endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {}", preview(.body, BODY_PREVIEW_BYTES))]
    Transport { status: u16, body: String },

    /// The endpoint answered successfully but the body did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// HTTP status carried by a [`ApiError::Transport`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for 4xx responses, which repeating the same request will not fix.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }
}

/// Errors from configuration loading and request building.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Prompt text is empty")]
    EmptyPrompt,

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },
}
