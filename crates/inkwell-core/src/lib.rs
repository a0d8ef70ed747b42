//! Text generation orchestration for Inkwell.

mod generator;

pub use generator::{GenerationEvent, Generator};
