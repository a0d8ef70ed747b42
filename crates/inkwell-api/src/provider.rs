//! OpenAI-compatible provider implementation.

use crate::client::ApiClient;
use inkwell_types::provider::{BoxFuture, ChatTransport, TextStream};
use inkwell_types::{ApiError, ChatCompletionRequest, WireFormat};

/// Any endpoint speaking the OpenAI chat-completions dialect.
///
/// Wraps `ApiClient` and implements the `ChatTransport` trait, delegating
/// all calls to the underlying client.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    client: ApiClient,
}

impl OpenAiCompatProvider {
    pub fn new(endpoint_url: impl Into<String>, wire: WireFormat) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(endpoint_url, wire)?,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl ChatTransport for OpenAiCompatProvider {
    fn complete<'a>(
        &'a self,
        token: &'a str,
        request: &'a ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<String, ApiError>> {
        Box::pin(self.client.complete(token, request))
    }

    fn complete_stream<'a>(
        &'a self,
        token: &'a str,
        request: &'a ChatCompletionRequest,
    ) -> BoxFuture<'a, Result<TextStream, ApiError>> {
        Box::pin(async move {
            let stream = self.client.complete_stream(token, request).await?;
            Ok(Box::pin(stream) as TextStream)
        })
    }

    fn name(&self) -> &str {
        "openai-compat"
    }
}
