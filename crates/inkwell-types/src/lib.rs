//! Shared request types, model catalog and error hierarchy for Inkwell.

pub mod error;
pub mod model;
pub mod provider;
pub mod request;
pub mod wire;

pub use error::{ApiError, ConfigError, GenerateError, preview};
pub use model::{ModelId, ModelInfo, available_models, default_model, find_model};
pub use provider::{ChatTransport, SecretResolver, StaticSecret, TextStream};
pub use request::{ChatCompletionRequest, ChatMessage, GenerationOptions, GenerationRequest};
pub use wire::WireFormat;
