//! Components container for reusable definitions.
//!
//! Field declaration order is the serialization order of the generated document.

use super::{
    header::Header,
    map::Map,
    media::{Example, MediaType},
    parameter::Parameter,
    path::PathItem,
    request_body::RequestBody,
    response::{Link, Response},
    schema::{RefOr, Schema},
    security::SecurityScheme,
};

/// Reusable component definitions.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Components {
    /// Reusable schema definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Map<String, RefOr<Schema>>>,

    /// Reusable security scheme definitions.
    #[serde(rename = "securitySchemes", skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<Map<String, SecurityScheme>>,

    /// Reusable parameter definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, RefOr<Parameter>>>,

    /// Reusable response definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Map<String, RefOr<Response>>>,

    /// Reusable header definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, RefOr<Header>>>,

    /// Reusable request body definitions.
    #[serde(rename = "requestBodies", skip_serializing_if = "Option::is_none")]
    pub request_bodies: Option<Map<String, RefOr<RequestBody>>>,

    /// Reusable media type definitions.
    #[serde(rename = "mediaTypes", skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Map<String, MediaType>>,

    /// Reusable example definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Map<String, RefOr<Example>>>,

    /// Reusable link definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, RefOr<Link>>>,

    /// Reusable callback definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Map<String, RefOr<PathItem>>>,

    /// Reusable path item definitions.
    #[serde(rename = "pathItems", skip_serializing_if = "Option::is_none")]
    pub path_items: Option<Map<String, PathItem>>,
}

impl Components {
    /// Creates a new empty components container.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no component map holds any entry.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_none()
            && self.security_schemes.is_none()
            && self.parameters.is_none()
            && self.responses.is_none()
            && self.headers.is_none()
            && self.request_bodies.is_none()
            && self.media_types.is_none()
            && self.examples.is_none()
            && self.links.is_none()
            && self.callbacks.is_none()
            && self.path_items.is_none()
    }

    /// Sets the schemas.
    pub fn schemas(mut self, schemas: Map<String, RefOr<Schema>>) -> Self {
        self.schemas = Some(schemas);
        self
    }

    /// Sets the security schemes.
    pub fn security_schemes(mut self, security_schemes: Map<String, SecurityScheme>) -> Self {
        self.security_schemes = Some(security_schemes);
        self
    }

    /// Sets the parameters.
    pub fn parameters(mut self, parameters: Map<String, RefOr<Parameter>>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Sets the responses.
    pub fn responses(mut self, responses: Map<String, RefOr<Response>>) -> Self {
        self.responses = Some(responses);
        self
    }
}
