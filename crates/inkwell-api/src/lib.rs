//! Streaming chat-completion client with SSE line decoding for Inkwell.

mod accumulate;
mod client;
mod provider;
mod sse;
mod stream;

pub use accumulate::{Accumulator, AccumulatorState, Step};
pub use client::ApiClient;
pub use provider::OpenAiCompatProvider;
pub use sse::{EventLine, LineDecoder};
pub use stream::CompletionStream;
