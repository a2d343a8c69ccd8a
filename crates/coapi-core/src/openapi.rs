//! OpenAPI document model types and structures.
//!
//! This module provides the core types for representing an OpenAPI 3.x document,
//! the machine-readable description of an HTTP API.

pub mod components;
pub mod extensions;
pub mod external_docs;
pub mod header;
pub mod info;
pub mod map;
pub mod media;
pub mod parameter;
pub mod path;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod tag;

pub use self::{
    components::Components,
    extensions::Extensions,
    external_docs::ExternalDocs,
    header::Header,
    info::{Contact, Info, License},
    map::Map,
    media::{Encoding, Example, MediaType},
    parameter::{Parameter, ParameterIn, ParameterStyle, RESERVED_HEADERS},
    path::{HttpMethod, Operation, PathItem, Paths},
    request_body::RequestBody,
    response::{Link, Response},
    schema::{Array, Discriminator, Object, Ref, RefOr, Schema, SchemaType, Xml},
    security::{
        ApiKeyLocation, OauthFlow, OauthFlowType, OauthFlows, SecurityRequirement, SecurityScheme,
        SecuritySchemeType,
    },
    server::{Server, ServerVariable},
    tag::Tag,
};

/// The version emitted when a document does not set one explicitly.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.2.0";

/// The root object of an OpenAPI document.
///
/// Field declaration order is the serialization order of the generated
/// document: `openapi`, `$self`, `jsonSchemaDialect`, extension fields,
/// `info`, `externalDocs`, `tags`, `security`, `servers`, `components`,
/// `webhooks`, `paths`. All collections are omitted when empty except
/// `paths`, which stays present as `{}` to keep the document structurally
/// valid.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OpenApi {
    /// The OpenAPI specification version.
    pub openapi: String,

    /// The URI of this document itself.
    #[serde(rename = "$self", skip_serializing_if = "Option::is_none")]
    pub self_uri: Option<String>,

    /// The default JSON Schema dialect for inline schemas.
    #[serde(rename = "jsonSchemaDialect", skip_serializing_if = "Option::is_none")]
    pub json_schema_dialect: Option<String>,

    /// Extension properties.
    #[serde(skip_serializing_if = "Option::is_none", flatten)]
    pub extensions: Option<Extensions>,

    /// Core metadata about the API.
    pub info: Info,

    /// External documentation reference.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    /// Tags for organizing operations into groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,

    /// Security requirements applying to the whole API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    /// The servers hosting the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    /// Reusable component definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    /// Webhooks the API can deliver, keyed by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<Map<String, PathItem>>,

    /// The routes exposed by the API. Always serialized, `{}` when empty.
    #[serde(default)]
    pub paths: Paths,
}

impl OpenApi {
    /// Creates a new document with the given info and the default version.
    pub fn new(info: Info) -> Self {
        Self {
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            self_uri: None,
            json_schema_dialect: None,
            extensions: None,
            info,
            external_docs: None,
            tags: None,
            security: None,
            servers: None,
            components: None,
            webhooks: None,
            paths: Paths::new(),
        }
    }

    /// Sets the document self URI.
    pub fn self_uri(mut self, self_uri: impl Into<String>) -> Self {
        self.self_uri = Some(self_uri.into());
        self
    }

    /// Sets the JSON Schema dialect.
    pub fn json_schema_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.json_schema_dialect = Some(dialect.into());
        self
    }

    /// Sets the external documentation.
    pub fn external_docs(mut self, external_docs: ExternalDocs) -> Self {
        self.external_docs = Some(external_docs);
        self
    }

    /// Sets the tags.
    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Sets the root security requirements.
    pub fn security(mut self, security: Vec<SecurityRequirement>) -> Self {
        self.security = Some(security);
        self
    }

    /// Sets the servers.
    pub fn servers(mut self, servers: Vec<Server>) -> Self {
        self.servers = Some(servers);
        self
    }

    /// Sets the components.
    pub fn components(mut self, components: Components) -> Self {
        self.components = Some(components);
        self
    }

    /// Sets the webhooks.
    pub fn webhooks(mut self, webhooks: Map<String, PathItem>) -> Self {
        self.webhooks = Some(webhooks);
        self
    }
}

impl Default for OpenApi {
    fn default() -> Self {
        Self::new(Info::default())
    }
}
