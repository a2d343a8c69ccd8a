//! Response and link entities.

use super::{header::Header, map::Map, media::MediaType, schema::RefOr, server::Server};

/// Describes a single response of an operation.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Response {
    /// A short summary of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A description of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Headers sent with the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, RefOr<Header>>>,

    /// A map of media types to their schemas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, MediaType>>,

    /// Links that can be followed from the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, RefOr<Link>>>,
}

impl Response {
    /// Creates a new empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the summary for the response.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description for the response.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the response headers.
    pub fn headers(mut self, headers: Map<String, RefOr<Header>>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets the content (media types) for the response.
    pub fn content(mut self, content: Map<String, MediaType>) -> Self {
        self.content = Some(content);
        self
    }

    /// Sets the links for the response.
    pub fn links(mut self, links: Map<String, RefOr<Link>>) -> Self {
        self.links = Some(links);
        self
    }
}

/// A design-time link from a response to another operation.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Link {
    /// A relative or absolute URI reference to the target operation.
    #[serde(rename = "operationRef", skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,

    /// The operationId of the target operation.
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// Parameter values to pass to the target operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, serde_json::Value>>,

    /// The request body to pass to the target operation.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Value>,

    /// A description of the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The server to use for the target operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,
}

impl Link {
    /// Creates a new empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation reference.
    pub fn operation_ref(mut self, operation_ref: impl Into<String>) -> Self {
        self.operation_ref = Some(operation_ref.into());
        self
    }

    /// Sets the operation id.
    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
