//! Async stream that turns a chat-completion body into growing response text.

use crate::accumulate::{Accumulator, Step};
use crate::sse::{EventLine, LineDecoder};
use futures_core::Stream;
use inkwell_types::{ApiError, WireFormat};
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll};

type ByteStream = Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>;

pin_project! {
    /// An async stream of the full response text, one item per text delta.
    ///
    /// Each item extends the previous one. The stream ends after the
    /// termination sentinel or at end of body. A body read error is yielded
    /// once and ends the stream.
    pub struct CompletionStream {
        #[pin]
        inner: ByteStream,
        decoder: LineDecoder,
        accumulator: Accumulator,
        lines: VecDeque<EventLine>,
        body_ended: bool,
    }
}

impl CompletionStream {
    /// Create a new CompletionStream from a reqwest byte stream.
    pub fn new(
        byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
        wire: &WireFormat,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            decoder: LineDecoder::new(wire.event_prefix.clone()),
            accumulator: Accumulator::new(wire),
            lines: VecDeque::new(),
            body_ended: false,
        }
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        self.accumulator.text()
    }

    /// Drive the stream to completion, calling `on_progress` with the full
    /// text after every delta, and return the final text.
    pub async fn collect_text<F>(mut self, mut on_progress: F) -> Result<String, ApiError>
    where
        F: FnMut(&str),
    {
        let mut this = Pin::new(&mut self);
        while let Some(item) = poll_fn(|cx| this.as_mut().poll_next(cx)).await {
            on_progress(&item?);
        }
        Ok(self.accumulator.into_text())
    }
}

impl Stream for CompletionStream {
    type Item = Result<String, ApiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if this.accumulator.is_finished() {
                return Poll::Ready(None);
            }

            // Drain lines already decoded before reading more of the body
            while let Some(line) = this.lines.pop_front() {
                match this.accumulator.apply(&line) {
                    Step::Progress(text) => return Poll::Ready(Some(Ok(text.to_string()))),
                    Step::Skip => continue,
                    Step::Done => {
                        this.lines.clear();
                        return Poll::Ready(None);
                    }
                }
            }

            if *this.body_ended {
                this.accumulator.finish();
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.lines.extend(this.decoder.feed(&bytes));
                }
                Poll::Ready(Some(Err(e))) => {
                    this.accumulator.fail();
                    this.lines.clear();
                    return Poll::Ready(Some(Err(ApiError::Network(e.to_string()))));
                }
                Poll::Ready(None) => {
                    *this.body_ended = true;
                    this.lines.extend(this.decoder.finish());
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
