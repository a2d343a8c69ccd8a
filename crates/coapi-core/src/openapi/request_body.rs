//! Request body entity.

use super::{map::Map, media::MediaType};

/// Describes a single request body.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RequestBody {
    /// A description of the request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The content of the request body keyed by media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, MediaType>>,

    /// Whether the request body is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl RequestBody {
    /// Creates a new empty request body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the content map.
    pub fn content(mut self, content: Map<String, MediaType>) -> Self {
        self.content = Some(content);
        self
    }

    /// Sets whether the body is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}
