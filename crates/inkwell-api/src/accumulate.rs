//! Folds decoded event lines into the running response text.

use crate::sse::EventLine;
use inkwell_types::{WireFormat, preview};

/// Lifecycle of one streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    AwaitingFirstEvent,
    Streaming,
    Done,
    Failed,
}

/// Outcome of applying one line.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a> {
    /// Text grew; carries the full text so far.
    Progress(&'a str),
    /// Nothing to report (garbled line, empty delta, or already finished).
    Skip,
    /// The termination sentinel was seen.
    Done,
}

/// Owns the text of one response while it streams in.
#[derive(Debug)]
pub struct Accumulator {
    done_sentinel: String,
    delta_pointer: String,
    text: String,
    state: AccumulatorState,
}

impl Accumulator {
    pub fn new(wire: &WireFormat) -> Self {
        Self {
            done_sentinel: wire.done_sentinel.clone(),
            delta_pointer: wire.delta_content_pointer.clone(),
            text: String::new(),
            state: AccumulatorState::AwaitingFirstEvent,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, AccumulatorState::Done | AccumulatorState::Failed)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn apply(&mut self, line: &EventLine) -> Step<'_> {
        if self.is_finished() {
            return Step::Skip;
        }
        self.state = AccumulatorState::Streaming;

        let payload = line.payload.trim();
        if payload == self.done_sentinel {
            tracing::debug!("Stream sentinel received after {} bytes", self.text.len());
            self.state = AccumulatorState::Done;
            return Step::Done;
        }

        let value: serde_json::Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Skipping unparseable stream event: {e}");
                tracing::debug!("Raw event payload: {}", preview(payload, 256));
                return Step::Skip;
            }
        };

        match value.pointer(&self.delta_pointer).and_then(|v| v.as_str()) {
            Some(delta) if !delta.is_empty() => {
                self.text.push_str(delta);
                Step::Progress(&self.text)
            }
            _ => {
                tracing::trace!("Event carried no text delta");
                Step::Skip
            }
        }
    }

    /// Mark the body as ended without a sentinel.
    pub fn finish(&mut self) {
        if !self.is_finished() {
            self.state = AccumulatorState::Done;
        }
    }

    /// Mark the response as failed; the partial text must not be used.
    pub fn fail(&mut self) {
        self.state = AccumulatorState::Failed;
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
