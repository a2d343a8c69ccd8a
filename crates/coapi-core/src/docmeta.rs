//! Structured metadata extracted from one annotated block comment.
//!
//! The doc-directive parser fills one [`DocMetadata`] per comment block; the
//! aggregator folds these records into the document model.

/// Everything a single annotated comment block can declare.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocMetadata {
    /// The route target, when the block documents an operation.
    pub route: Option<RouteDoc>,

    /// The unique operation identifier.
    pub operation_id: Option<String>,

    /// A one-line summary.
    pub summary: Option<String>,

    /// A longer description.
    pub description: Option<String>,

    /// Whether the operation is deprecated.
    pub deprecated: bool,

    /// Operation tags.
    pub tags: Vec<String>,

    /// Tag metadata declarations (`@tagMeta`).
    pub tag_meta: Vec<TagMetaDoc>,

    /// Operation parameters.
    pub params: Vec<ParamDoc>,

    /// Operation responses.
    pub returns: Vec<ReturnDoc>,

    /// Response headers, keyed to a status code.
    pub response_headers: Vec<ResponseHeaderDoc>,

    /// Response links, keyed to a status code.
    pub links: Vec<LinkDoc>,

    /// Security requirements for the operation or document root.
    pub security: Vec<SecurityDoc>,

    /// Security scheme definitions.
    pub security_schemes: Vec<SchemeDoc>,

    /// Server declarations (with their variables).
    pub servers: Vec<ServerDoc>,

    /// The request body declaration.
    pub request_body: Option<BodyDoc>,

    /// Encoding declarations for the request body.
    pub encodings: Vec<EncodingDoc>,

    /// External documentation URL and trailing description.
    pub external_docs: Option<ExternalDocsDoc>,

    /// Contact information for the document info block.
    pub contact: Option<ContactDoc>,

    /// License information for the document info block.
    pub license: Option<LicenseDoc>,

    /// Document info fields (`@infoTitle` and friends).
    pub info: InfoDoc,

    /// The JSON Schema dialect URI.
    pub json_schema_dialect: Option<String>,
}

impl DocMetadata {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the block carries any document-level (non-operation)
    /// directive worth folding into the root document.
    pub fn has_global_meta(&self) -> bool {
        self.contact.is_some()
            || self.license.is_some()
            || self.external_docs.is_some()
            || self.json_schema_dialect.is_some()
            || !self.servers.is_empty()
            || !self.tag_meta.is_empty()
            || self.info.title.is_some()
            || self.info.version.is_some()
            || self.info.summary.is_some()
            || self.info.description.is_some()
            || self.info.terms_of_service.is_some()
    }
}

/// The route or webhook target of an operation block.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDoc {
    /// The uppercase HTTP verb, when given. Defaults to GET downstream.
    pub verb: Option<String>,
    /// The route template (for routes) or webhook name.
    pub path: String,
    /// Whether the block declares a webhook rather than a path.
    pub webhook: bool,
}

/// One `@param` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamDoc {
    /// The parameter name.
    pub name: String,
    /// The trailing description.
    pub description: Option<String>,
    /// The `in` attribute, verbatim.
    pub location: Option<String>,
    /// The `required` flag.
    pub required: Option<bool>,
    /// The `contentType` attribute.
    pub content_type: Option<String>,
    /// The `format` attribute.
    pub format: Option<String>,
    /// The `style` attribute, verbatim.
    pub style: Option<String>,
    /// The `explode` flag.
    pub explode: Option<bool>,
    /// The `allowReserved` flag.
    pub allow_reserved: Option<bool>,
    /// The `allowEmptyValue` flag.
    pub allow_empty_value: Option<bool>,
    /// The `itemSchema` attribute (a type name).
    pub item_schema: Option<String>,
    /// The `deprecated` flag.
    pub deprecated: Option<bool>,
    /// The `example` attribute, verbatim.
    pub example: Option<String>,
}

/// One `@return` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnDoc {
    /// The status code (e.g., "200", "default").
    pub status: String,
    /// The trailing description.
    pub description: Option<String>,
    /// The `contentType` attribute.
    pub content_type: Option<String>,
    /// The `summary` attribute.
    pub summary: Option<String>,
    /// The `itemSchema` attribute (a type name).
    pub item_schema: Option<String>,
    /// The `example` attribute, verbatim.
    pub example: Option<String>,
    /// The schema type name for the response body.
    pub schema: Option<String>,
}

/// One `@responseHeader` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseHeaderDoc {
    /// The status code the header belongs to.
    pub status: String,
    /// The header name.
    pub name: String,
    /// The trailing description.
    pub description: Option<String>,
    /// The `required` flag.
    pub required: Option<bool>,
    /// The value schema type name.
    pub schema: Option<String>,
}

/// One `@link` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkDoc {
    /// The status code the link belongs to.
    pub status: String,
    /// The link name.
    pub name: String,
    /// The trailing description.
    pub description: Option<String>,
    /// The `operationId` attribute.
    pub operation_id: Option<String>,
    /// The `operationRef` attribute.
    pub operation_ref: Option<String>,
}

/// One `@security` requirement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SecurityDoc {
    /// The scheme name.
    pub name: String,
    /// The required scopes.
    pub scopes: Vec<String>,
}

/// One `@securityScheme` definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemeDoc {
    /// The scheme name.
    pub name: String,
    /// The scheme type, verbatim (`apiKey`, `http`, `oauth2`, ...).
    pub scheme_type: Option<String>,
    /// The trailing description.
    pub description: Option<String>,
    /// The apiKey parameter name.
    pub param_name: Option<String>,
    /// The apiKey location, verbatim.
    pub location: Option<String>,
    /// The HTTP authorization scheme.
    pub http_scheme: Option<String>,
    /// The bearer format hint.
    pub bearer_format: Option<String>,
    /// The OpenID Connect discovery URL.
    pub open_id_connect_url: Option<String>,
    /// OAuth flow declarations.
    pub flows: Vec<FlowDoc>,
}

/// One OAuth flow inside a `@securityScheme`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowDoc {
    /// The flow type, verbatim (`implicit`, `password`, ...).
    pub flow_type: String,
    /// The authorization endpoint.
    pub authorization_url: Option<String>,
    /// The token endpoint.
    pub token_url: Option<String>,
    /// The refresh endpoint.
    pub refresh_url: Option<String>,
    /// The device-authorization endpoint.
    pub device_authorization_url: Option<String>,
    /// Scope name/description pairs; the description may be empty.
    pub scopes: Vec<(String, String)>,
}

/// One `@server` declaration with its `@serverVar` variables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerDoc {
    /// The server URL template.
    pub url: String,
    /// The trailing description.
    pub description: Option<String>,
    /// The short server name.
    pub name: Option<String>,
    /// Variables declared by subsequent `@serverVar` lines.
    pub variables: Vec<ServerVarDoc>,
}

/// One `@serverVar` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerVarDoc {
    /// The variable name.
    pub name: String,
    /// The `default` attribute.
    pub default: Option<String>,
    /// The `enum` attribute, comma split.
    pub enum_values: Vec<String>,
    /// The trailing description.
    pub description: Option<String>,
}

/// The `@requestBody` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodyDoc {
    /// The `contentType` attribute; defaults to `application/json` downstream.
    pub content_type: Option<String>,
    /// The `required` flag.
    pub required: Option<bool>,
    /// The schema type name.
    pub schema: Option<String>,
    /// The trailing description.
    pub description: Option<String>,
}

/// One `@encoding`, `@prefixEncoding` or `@itemEncoding` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingDoc {
    /// What the encoding applies to.
    pub target: EncodingTarget,
    /// The `contentType` attribute.
    pub content_type: Option<String>,
    /// The `style` attribute, verbatim.
    pub style: Option<String>,
    /// The `explode` flag.
    pub explode: Option<bool>,
    /// The `allowReserved` flag.
    pub allow_reserved: Option<bool>,
}

/// The target of an encoding declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingTarget {
    /// A named body property (`@encoding <name>`).
    Property(String),
    /// A tuple position (`@prefixEncoding`).
    Prefix,
    /// Every array item (`@itemEncoding`).
    Item,
}

/// The `@externalDocs` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalDocsDoc {
    /// The documentation URL.
    pub url: String,
    /// The trailing description.
    pub description: Option<String>,
}

/// The `@contact` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactDoc {
    /// The contact name (trailing free text).
    pub name: Option<String>,
    /// The `url` attribute.
    pub url: Option<String>,
    /// The `email` attribute.
    pub email: Option<String>,
}

/// The `@license` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LicenseDoc {
    /// The license name (trailing free text).
    pub name: String,
    /// The `identifier` attribute (SPDX expression).
    pub identifier: Option<String>,
    /// The `url` attribute.
    pub url: Option<String>,
}

/// One `@tagMeta` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagMetaDoc {
    /// The tag name.
    pub name: String,
    /// The `summary` attribute.
    pub summary: Option<String>,
    /// The trailing description.
    pub description: Option<String>,
    /// The `parent` attribute.
    pub parent: Option<String>,
    /// The `kind` attribute.
    pub kind: Option<String>,
    /// The `externalDocs` attribute (a URL).
    pub external_docs: Option<String>,
}

/// Document info fields settable from directives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InfoDoc {
    /// The `@infoTitle` value.
    pub title: Option<String>,
    /// The `@infoVersion` value.
    pub version: Option<String>,
    /// The `@infoSummary` value.
    pub summary: Option<String>,
    /// The `@infoDescription` value.
    pub description: Option<String>,
    /// The `@termsOfService` value.
    pub terms_of_service: Option<String>,
}
