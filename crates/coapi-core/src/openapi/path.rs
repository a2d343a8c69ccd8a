//! Path item and operation entities.

use super::{
    external_docs::ExternalDocs,
    map::Map,
    parameter::Parameter,
    request_body::RequestBody,
    response::Response,
    schema::RefOr,
    security::SecurityRequirement,
    server::Server,
};

/// A map of route templates to their path items.
pub type Paths = Map<String, PathItem>;

/// The operations available on a single route.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct PathItem {
    /// A short summary for the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A description for the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The GET operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    /// The PUT operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    /// The POST operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    /// The DELETE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    /// The OPTIONS operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,

    /// The HEAD operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,

    /// The PATCH operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,

    /// The TRACE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    /// The QUERY operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Operation>,

    /// Operations keyed by non-standard method names.
    #[serde(rename = "additionalOperations", skip_serializing_if = "Option::is_none")]
    pub additional_operations: Option<Map<String, Operation>>,

    /// Server overrides for every operation on the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    /// Parameters shared by every operation on the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOr<Parameter>>>,
}

impl PathItem {
    /// Creates a new empty path item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `op` under the given method. A standard verb lands in its
    /// dedicated slot; anything else goes into `additionalOperations`.
    /// An already-occupied slot is left as-is and `op` is returned back.
    pub fn insert_operation(&mut self, method: &HttpMethod, op: Operation) -> Option<Operation> {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
            HttpMethod::Query => &mut self.query,
            HttpMethod::Other(name) => {
                let extra = self.additional_operations.get_or_insert_with(Map::new);
                return extra.insert(name.clone(), op);
            }
        };
        match slot {
            Some(_) => Some(op),
            None => {
                *slot = Some(op);
                None
            }
        }
    }

    /// Returns the operation registered under the given method, if any.
    pub fn operation(&self, method: &HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
            HttpMethod::Query => self.query.as_ref(),
            HttpMethod::Other(name) => self.additional_operations.as_ref()?.get(name),
        }
    }
}

/// An HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// PUT.
    Put,
    /// POST.
    Post,
    /// DELETE.
    Delete,
    /// OPTIONS.
    Options,
    /// HEAD.
    Head,
    /// PATCH.
    Patch,
    /// TRACE.
    Trace,
    /// QUERY.
    Query,
    /// A free-form method stored under `additionalOperations`.
    Other(String),
}

impl HttpMethod {
    /// Parses an uppercase verb into a method, falling back to `Other`.
    pub fn parse(verb: &str) -> Self {
        match verb {
            "GET" => Self::Get,
            "PUT" => Self::Put,
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            "HEAD" => Self::Head,
            "PATCH" => Self::Patch,
            "TRACE" => Self::Trace,
            "QUERY" => Self::Query,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A single API operation on a path.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Operation {
    /// Tags for grouping the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// A short summary of the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A description of the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// External documentation for the operation.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    /// A unique identifier for the operation.
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// Parameters for the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOr<Parameter>>>,

    /// The request body for the operation.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,

    /// Responses keyed by status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Map<String, RefOr<Response>>>,

    /// Callbacks keyed by expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Map<String, RefOr<PathItem>>>,

    /// Whether the operation is deprecated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// Security requirements overriding the document default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    /// Server overrides for the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
}

impl Operation {
    /// Creates a new empty operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Sets the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the operation id.
    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Sets the parameters.
    pub fn parameters(mut self, parameters: Vec<RefOr<Parameter>>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Sets the request body.
    pub fn request_body(mut self, request_body: RefOr<RequestBody>) -> Self {
        self.request_body = Some(request_body);
        self
    }

    /// Sets the responses.
    pub fn responses(mut self, responses: Map<String, RefOr<Response>>) -> Self {
        self.responses = Some(responses);
        self
    }

    /// Sets the deprecation flag.
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Sets the security requirements.
    pub fn security(mut self, security: Vec<SecurityRequirement>) -> Self {
        self.security = Some(security);
        self
    }

    /// Sets the server overrides.
    pub fn servers(mut self, servers: Vec<Server>) -> Self {
        self.servers = Some(servers);
        self
    }
}
