//! The caller-facing generation entry point.

use futures_util::StreamExt;
use inkwell_types::{
    ChatCompletionRequest, ChatTransport, GenerateError, GenerationOptions, GenerationRequest,
    SecretResolver, WireFormat,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Events pushed to a caller observing a generation.
///
/// Zero or more `Text` events are followed by exactly one `Complete` or
/// `Failed`.
#[derive(Debug)]
pub enum GenerationEvent {
    /// The full text generated so far.
    Text(String),
    /// The final text.
    Complete(String),
    /// The request failed; any partial text is void.
    Failed(GenerateError),
}

/// Turns prompts into generated text through a [`ChatTransport`].
///
/// Cheap to clone. Each call owns its own request state, so concurrent
/// calls share nothing mutable.
#[derive(Clone)]
pub struct Generator {
    transport: Arc<dyn ChatTransport>,
    secrets: Arc<dyn SecretResolver>,
    wire: WireFormat,
}

impl Generator {
    pub fn new(transport: Arc<dyn ChatTransport>, secrets: Arc<dyn SecretResolver>) -> Self {
        Self {
            transport,
            secrets,
            wire: WireFormat::default(),
        }
    }

    /// Use a non-default message layout (prompt role, placeholder message).
    pub fn with_wire_format(mut self, wire: WireFormat) -> Self {
        self.wire = wire;
        self
    }

    /// Generate text for `prompt`, returning only the final value.
    pub async fn generate(
        &self,
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> Result<String, GenerateError> {
        self.generate_with_progress(prompt, options, |_| {}).await
    }

    /// Generate text for `prompt`.
    ///
    /// When streaming, `on_progress` receives the full text after every
    /// delta. Requests are validated and the API key resolved before any
    /// network traffic. There is no retry, timeout or cancellation.
    pub async fn generate_with_progress<F>(
        &self,
        prompt: impl Into<String>,
        options: GenerationOptions,
        mut on_progress: F,
    ) -> Result<String, GenerateError>
    where
        F: FnMut(&str),
    {
        let request = GenerationRequest::build(prompt, options)?;

        let token = self
            .secrets
            .api_key()
            .await
            .filter(|k| !k.is_empty())
            .ok_or(GenerateError::MissingCredential)?;

        let body = ChatCompletionRequest::from_generation(&request, &self.wire);
        tracing::debug!(
            "Generating via {} (model: {}, stream: {})",
            self.transport.name(),
            request.model(),
            request.stream()
        );

        if !request.stream() {
            return Ok(self.transport.complete(&token, &body).await?);
        }

        let mut stream = self.transport.complete_stream(&token, &body).await?;
        let mut text = String::new();
        while let Some(item) = stream.next().await {
            text = item?;
            on_progress(&text);
        }
        tracing::debug!("Generation finished ({} bytes)", text.len());
        Ok(text)
    }

    /// Run a generation in the background, pushing its progress to a channel.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn generate_events(
        &self,
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> mpsc::UnboundedReceiver<GenerationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let generator = self.clone();
        let prompt = prompt.into();

        tokio::spawn(async move {
            let progress = tx.clone();
            let result = generator
                .generate_with_progress(prompt, options, |text| {
                    let _ = progress.send(GenerationEvent::Text(text.to_string()));
                })
                .await;
            let last = match result {
                Ok(text) => GenerationEvent::Complete(text),
                Err(e) => {
                    tracing::warn!("Generation failed: {e}");
                    GenerationEvent::Failed(e)
                }
            };
            let _ = tx.send(last);
        });

        rx
    }
}
