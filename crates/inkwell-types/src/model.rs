//! Static catalog of models offered for selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a model as understood by the remote endpoint.
///
/// Any string is accepted; the catalog only lists the ids offered to users,
/// the endpoint decides what it actually serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub display_name: &'static str,
}

impl ModelInfo {
    pub fn model_id(&self) -> ModelId {
        ModelId::new(self.id)
    }
}

/// Id used when a request does not name a model.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-pro-exp-03-25";

/// Every model offered for selection, in display order.
pub const MODEL_CATALOG: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-2.5-flash-preview-04-17",
        display_name: "Gemini 2.5 Flash",
    },
    ModelInfo {
        id: DEFAULT_MODEL_ID,
        display_name: "Gemini 2.5 Pro",
    },
];

pub fn available_models() -> &'static [ModelInfo] {
    MODEL_CATALOG
}

pub fn default_model() -> ModelId {
    ModelId::new(DEFAULT_MODEL_ID)
}

/// Look up a catalog entry. `None` does not mean the id is unusable.
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODEL_CATALOG.iter().find(|m| m.id == id)
}
