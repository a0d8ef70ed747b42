//! OpenAI-compatible chat-completion client.

use inkwell_types::{ApiError, ChatCompletionRequest, WireFormat};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::stream::CompletionStream;

/// Client for a single chat-completion endpoint.
///
/// No timeout is configured; callers needing bounded latency wrap the call.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint_url: String,
    wire: WireFormat,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(endpoint_url: impl Into<String>, wire: WireFormat) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint_url: endpoint_url.into(),
            wire,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn wire(&self) -> &WireFormat {
        &self.wire
    }

    /// Send a buffered request and extract the generated text.
    pub async fn complete(
        &self,
        token: &str,
        request: &ChatCompletionRequest,
    ) -> Result<String, ApiError> {
        let response = self.send(token, request, false).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        extract_message_content(&body, &self.wire.message_content_pointer)
    }

    /// Send a streaming request and return the text stream.
    pub async fn complete_stream(
        &self,
        token: &str,
        request: &ChatCompletionRequest,
    ) -> Result<CompletionStream, ApiError> {
        let response = self.send(token, request, true).await?;
        Ok(CompletionStream::new(response.bytes_stream(), &self.wire))
    }

    /// POST the request, returning the response only if its status is a success.
    async fn send(
        &self,
        token: &str,
        request: &ChatCompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let headers = build_headers(token)?;

        let body = if request.stream == stream {
            serde_json::to_string(request)
        } else {
            serde_json::to_string(&ChatCompletionRequest {
                stream,
                ..request.clone()
            })
        }
        .map_err(|e| ApiError::BadRequest {
            message: format!("Failed to serialize request: {e}"),
        })?;

        tracing::debug!(
            "POST {} (model: {}, stream: {stream})",
            self.endpoint_url,
            request.model
        );

        let response = self
            .http
            .post(&self.endpoint_url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Read the whole body so the error carries the provider's diagnostics
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::Transport {
            status: status.as_u16(),
            body,
        };
        tracing::warn!("Chat completion request failed: {err}");
        Err(err)
    }
}

fn build_headers(token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let mut auth =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ApiError::Auth {
            message: "Invalid API key format".into(),
        })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

/// Pull the generated text out of a buffered response body.
fn extract_message_content(body: &str, pointer: &str) -> Result<String, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("response is not JSON: {e}")))?;

    value
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ApiError::MalformedResponse(format!("no string at {pointer}")))
}
