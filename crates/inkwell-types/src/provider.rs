//! Seams for swapping the chat-completion backend and the credential source.

use crate::{ApiError, ChatCompletionRequest};
use futures_core::Stream;
use std::future::Future;
use std::pin::Pin;

/// A boxed async stream yielding the full generated text after each delta.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ApiError>> + Send>>;

/// A boxed future, the shape every trait method here returns.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A chat-completion backend.
///
/// Dyn-compatible so callers can hold `Arc<dyn ChatTransport>`.
pub trait ChatTransport: Send + Sync {
    /// Send a buffered request and return the generated text.
    fn complete<'a>(
        &'a self,
        token: &'a str,
        request: &'a ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<String, ApiError>>;

    /// Send a streaming request. The returned stream ends on the termination
    /// sentinel or at end of body, whichever comes first.
    fn complete_stream<'a>(
        &'a self,
        token: &'a str,
        request: &'a ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<TextStream, ApiError>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Source of the API token, asked once per request.
pub trait SecretResolver: Send + Sync {
    fn api_key(&self) -> BoxFuture<'_, Option<String>>;
}

/// A resolver holding a fixed, possibly absent, token.
#[derive(Debug, Clone, Default)]
pub struct StaticSecret(Option<String>);

impl StaticSecret {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl SecretResolver for StaticSecret {
    fn api_key(&self) -> BoxFuture<'_, Option<String>> {
        let token = self.0.clone();
        Box::pin(async move { token })
    }
}
