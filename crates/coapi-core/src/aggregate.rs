//! Aggregation of inspected types and doc metadata into one document.
//!
//! The [`Spec`] owns the document model plus the registry of C-shaped type
//! definitions. Inputs arrive file by file; merging follows first-wins
//! semantics for scalars and fill-if-absent semantics for descriptions.

use tracing::debug;

use crate::{
    docmeta::{BodyDoc, DocMetadata, EncodingTarget, FlowDoc, ParamDoc, SchemeDoc, ServerDoc},
    error::Error,
    openapi::{
        ApiKeyLocation, Contact, Encoding, ExternalDocs, Header, HttpMethod, License, Link, Map,
        MediaType, OauthFlow, OauthFlowType, OauthFlows, OpenApi, Operation, Parameter,
        ParameterIn, ParameterStyle, Ref, RefOr, RequestBody, Response, Schema, SchemaType,
        SecurityRequirement, SecurityScheme, SecuritySchemeType, Server, ServerVariable, Tag,
    },
    types::{TypeDefList, TypeDefinition},
};

/// Logical type names that resolve without a schema registration.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "string", "integer", "number", "boolean", "object", "null", "array",
];

/// True when `name` is a self-describing primitive logical type.
pub fn is_primitive_type(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

/// Strips everything up to the last `/` in a reference path, yielding the
/// bare type name. A name without a `/` is returned unchanged.
pub fn type_from_ref(ref_path: &str) -> &str {
    match ref_path.rfind('/') {
        Some(idx) => &ref_path[idx + 1..],
        None => ref_path,
    }
}

/// The root intermediate model: the document under construction plus the
/// registry of type definitions recovered from source.
#[derive(Debug, Clone, Default)]
pub struct Spec {
    /// The OpenAPI document under construction.
    pub document: OpenApi,

    /// Registered type definitions, in registration order.
    pub types: TypeDefList,
}

impl Spec {
    /// Creates an empty spec with the default document version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers type definitions. A name already registered is skipped;
    /// the first registration wins and is never mutated.
    pub fn register_types(&mut self, types: TypeDefList) {
        for def in types {
            self.register_type(def);
        }
    }

    /// Registers a single type definition, first-wins.
    pub fn register_type(&mut self, def: TypeDefinition) {
        if self.types.iter().any(|t| t.name() == def.name()) {
            debug!(name = def.name(), "skipping duplicate type registration");
            return;
        }
        self.types.push(def);
    }

    /// Looks up a registered type by name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name() == name)
    }

    /// Folds one operation block into the paths map.
    ///
    /// The metadata must carry a route. A second operation under the same
    /// verb and route is a conflict: the document model holds one operation
    /// per slot.
    pub fn add_operation(&mut self, meta: &DocMetadata) -> Result<(), Error> {
        let route = meta
            .route
            .as_ref()
            .filter(|r| !r.webhook)
            .ok_or_else(|| Error::InvalidArgument("operation block without a route".into()))?;
        if route.path.is_empty() {
            return Err(Error::InvalidArgument("empty route path".into()));
        }

        let op = self.operation_from_meta(meta);
        self.note_implicit_tags(&meta.tags);

        let method = HttpMethod::parse(route.verb.as_deref().unwrap_or("GET"));
        let item = self.document.paths.entry(route.path.clone()).or_default();
        if item.insert_operation(&method, op).is_some() {
            return Err(Error::conflict(
                "paths",
                format!("{:?} {}", method, route.path),
                "duplicate operation for the same verb and route",
            ));
        }
        Ok(())
    }

    /// Folds one webhook block into the webhooks map.
    pub fn add_webhook_operation(&mut self, meta: &DocMetadata) -> Result<(), Error> {
        let route = meta
            .route
            .as_ref()
            .filter(|r| r.webhook)
            .ok_or_else(|| Error::InvalidArgument("webhook block without a name".into()))?;

        let op = self.operation_from_meta(meta);
        self.note_implicit_tags(&meta.tags);

        let method = HttpMethod::parse(route.verb.as_deref().unwrap_or("POST"));
        let hooks = self.document.webhooks.get_or_insert_with(Map::new);
        let item = hooks.entry(route.path.clone()).or_default();
        if item.insert_operation(&method, op).is_some() {
            return Err(Error::conflict(
                "webhooks",
                format!("{:?} {}", method, route.path),
                "duplicate operation for the same verb and webhook",
            ));
        }
        Ok(())
    }

    /// Folds doc-level global directives into the document root.
    ///
    /// Scalars follow first-set-wins; a mismatched second set is an error.
    /// Description-like fields are filled in when previously absent.
    pub fn apply_global_meta(&mut self, meta: &DocMetadata) -> Result<(), Error> {
        let info = &mut self.document.info;
        if let Some(title) = &meta.info.title {
            set_scalar("info.title", &mut info.title, title)?;
        }
        if let Some(version) = &meta.info.version {
            set_scalar("info.version", &mut info.version, version)?;
        }
        fill_opt(&mut info.summary, meta.info.summary.as_deref());
        fill_opt(&mut info.description, meta.info.description.as_deref());
        if let Some(tos) = &meta.info.terms_of_service {
            set_opt_scalar("info.termsOfService", &mut info.terms_of_service, tos)?;
        }

        if let Some(contact) = &meta.contact {
            let merged = info.contact.get_or_insert_with(Contact::new);
            if let Some(name) = &contact.name {
                set_opt_scalar("info.contact.name", &mut merged.name, name)?;
            }
            if let Some(url) = &contact.url {
                set_opt_scalar("info.contact.url", &mut merged.url, url)?;
            }
            if let Some(email) = &contact.email {
                set_opt_scalar("info.contact.email", &mut merged.email, email)?;
            }
        }

        if let Some(license) = &meta.license {
            if license.name.is_empty() {
                return Err(Error::InvalidArgument(
                    "license name is mandatory when any license field is set".into(),
                ));
            }
            if license.identifier.is_some() && license.url.is_some() {
                return Err(Error::InvalidArgument(
                    "license identifier and url are mutually exclusive".into(),
                ));
            }
            let merged = info.license.get_or_insert_with(|| License::new(""));
            set_scalar("info.license.name", &mut merged.name, &license.name)?;
            if let Some(identifier) = &license.identifier {
                if merged.url.is_some() {
                    return Err(Error::InvalidArgument(
                        "license identifier and url are mutually exclusive".into(),
                    ));
                }
                set_opt_scalar("info.license.identifier", &mut merged.identifier, identifier)?;
            }
            if let Some(url) = &license.url {
                if merged.identifier.is_some() {
                    return Err(Error::InvalidArgument(
                        "license identifier and url are mutually exclusive".into(),
                    ));
                }
                set_opt_scalar("info.license.url", &mut merged.url, url)?;
            }
        }

        if let Some(docs) = &meta.external_docs {
            let merged = self
                .document
                .external_docs
                .get_or_insert_with(|| ExternalDocs::new(""));
            set_scalar("externalDocs.url", &mut merged.url, &docs.url)?;
            fill_opt(&mut merged.description, docs.description.as_deref());
        }

        if let Some(dialect) = &meta.json_schema_dialect {
            set_opt_scalar(
                "jsonSchemaDialect",
                &mut self.document.json_schema_dialect,
                dialect,
            )?;
        }

        for server in &meta.servers {
            self.merge_server(server)?;
        }

        for tag_meta in &meta.tag_meta {
            self.merge_tag_meta(tag_meta);
        }

        // A blanket requirement declared outside an operation block applies
        // to the whole document.
        if meta.route.is_none() {
            for sec in &meta.security {
                let requirement = requirement_from_doc(sec);
                let roots = self.document.security.get_or_insert_with(Vec::new);
                if !roots.contains(&requirement) {
                    roots.push(requirement);
                }
            }
        }

        Ok(())
    }

    /// Merges the scheme definitions of one block into the components.
    ///
    /// Schemes merge by name; disagreement on the type or any scalar
    /// attribute fails. OAuth2 flows merge flow-by-flow, concatenating
    /// scopes and rejecting conflicting descriptions.
    pub fn apply_doc_security(&mut self, meta: &DocMetadata) -> Result<(), Error> {
        for doc in &meta.security_schemes {
            self.merge_security_scheme(doc)?;
        }
        Ok(())
    }

    fn merge_security_scheme(&mut self, doc: &SchemeDoc) -> Result<(), Error> {
        if doc.name.is_empty() {
            return Err(Error::InvalidArgument("security scheme without a name".into()));
        }
        let incoming = scheme_from_doc(doc)?;

        let components = self.document.components.get_or_insert_with(Default::default);
        let schemes = components.security_schemes.get_or_insert_with(Map::new);
        if !schemes.contains_key(&doc.name) {
            schemes.insert(doc.name.clone(), incoming);
            return Ok(());
        }
        let existing = schemes
            .get_mut(&doc.name)
            .ok_or_else(|| Error::NotFound(doc.name.clone()))?;

        if existing.scheme_type != incoming.scheme_type {
            return Err(Error::conflict(
                "securityScheme.type",
                format!("{:?}", existing.scheme_type),
                format!("{:?}", incoming.scheme_type),
            ));
        }
        fill_opt(&mut existing.description, incoming.description.as_deref());
        merge_opt_scalar("securityScheme.name", &mut existing.name, &incoming.name)?;
        if let (Some(a), Some(b)) = (existing.in_, incoming.in_)
            && a != b
        {
            return Err(Error::conflict(
                "securityScheme.in",
                format!("{a:?}"),
                format!("{b:?}"),
            ));
        }
        if existing.in_.is_none() {
            existing.in_ = incoming.in_;
        }
        merge_opt_scalar(
            "securityScheme.scheme",
            &mut existing.scheme,
            &incoming.scheme,
        )?;
        merge_opt_scalar(
            "securityScheme.bearerFormat",
            &mut existing.bearer_format,
            &incoming.bearer_format,
        )?;
        merge_opt_scalar(
            "securityScheme.openIdConnectUrl",
            &mut existing.open_id_connect_url,
            &incoming.open_id_connect_url,
        )?;

        if let Some(incoming_flows) = incoming.flows {
            let flows = existing.flows.get_or_insert_with(OauthFlows::new);
            let pairs = [
                (OauthFlowType::Implicit, incoming_flows.implicit),
                (OauthFlowType::Password, incoming_flows.password),
                (
                    OauthFlowType::ClientCredentials,
                    incoming_flows.client_credentials,
                ),
                (
                    OauthFlowType::AuthorizationCode,
                    incoming_flows.authorization_code,
                ),
                (
                    OauthFlowType::DeviceAuthorization,
                    incoming_flows.device_authorization,
                ),
            ];
            for (flow_type, new_flow) in pairs {
                let Some(new_flow) = new_flow else {
                    continue;
                };
                let slot = flows.slot_mut(flow_type);
                match slot {
                    None => *slot = Some(new_flow),
                    Some(old_flow) => merge_oauth_flow(old_flow, &new_flow)?,
                }
            }
        }
        Ok(())
    }

    fn merge_server(&mut self, doc: &ServerDoc) -> Result<(), Error> {
        if doc.url.contains('?') || doc.url.contains('#') {
            return Err(Error::InvalidArgument(format!(
                "server url {:?} must not contain '?' or '#'",
                doc.url
            )));
        }
        let mut variables = Map::new();
        for var in &doc.variables {
            let Some(default) = &var.default else {
                return Err(Error::InvalidArgument(format!(
                    "server variable {:?} requires a default value",
                    var.name
                )));
            };
            if !var.enum_values.is_empty() && !var.enum_values.contains(default) {
                return Err(Error::InvalidArgument(format!(
                    "server variable {:?} default {:?} is not in its enum",
                    var.name, default
                )));
            }
            let mut variable = ServerVariable::new(default.clone());
            if !var.enum_values.is_empty() {
                variable = variable.enum_values(var.enum_values.clone());
            }
            if let Some(description) = &var.description {
                variable = variable.description(description.clone());
            }
            variables.insert(var.name.clone(), variable);
        }

        let servers = self.document.servers.get_or_insert_with(Vec::new);
        if let Some(existing) = servers.iter_mut().find(|s| s.url == doc.url) {
            fill_opt(&mut existing.description, doc.description.as_deref());
            fill_opt(&mut existing.name, doc.name.as_deref());
            if !variables.is_empty() {
                let merged = existing.variables.get_or_insert_with(Map::new);
                for (name, variable) in variables {
                    merged.entry(name).or_insert(variable);
                }
            }
            return Ok(());
        }

        let mut server = Server::new(doc.url.clone());
        if let Some(description) = &doc.description {
            server = server.description(description.clone());
        }
        if let Some(name) = &doc.name {
            server = server.name(name.clone());
        }
        if !variables.is_empty() {
            server = server.variables(variables);
        }
        servers.push(server);
        Ok(())
    }

    fn merge_tag_meta(&mut self, meta: &crate::docmeta::TagMetaDoc) {
        let tags = self.document.tags.get_or_insert_with(Vec::new);
        if !tags.iter().any(|t| t.name == meta.name) {
            tags.push(Tag::new(meta.name.clone()));
        }
        let Some(tag) = tags.iter_mut().find(|t| t.name == meta.name) else {
            return;
        };
        fill_opt(&mut tag.summary, meta.summary.as_deref());
        fill_opt(&mut tag.description, meta.description.as_deref());
        fill_opt(&mut tag.parent, meta.parent.as_deref());
        fill_opt(&mut tag.kind, meta.kind.as_deref());
        if tag.external_docs.is_none()
            && let Some(url) = &meta.external_docs
        {
            tag.external_docs = Some(ExternalDocs::new(url.clone()));
        }
    }

    /// Records operation tags as document tags when not yet declared.
    fn note_implicit_tags(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        let tags = self.document.tags.get_or_insert_with(Vec::new);
        for name in names {
            if !tags.iter().any(|t| &t.name == name) {
                tags.push(Tag::new(name.clone()));
            }
        }
    }

    fn operation_from_meta(&self, meta: &DocMetadata) -> Operation {
        let mut op = Operation::new();
        if !meta.tags.is_empty() {
            op.tags = Some(meta.tags.clone());
        }
        op.summary = meta.summary.clone();
        op.description = meta.description.clone();
        op.operation_id = meta.operation_id.clone();
        if meta.deprecated {
            op.deprecated = Some(true);
        }
        if let Some(docs) = &meta.external_docs
            && meta.route.is_some()
        {
            let mut external = ExternalDocs::new(docs.url.clone());
            external.description = docs.description.clone();
            op.external_docs = Some(external);
        }

        let params: Vec<RefOr<Parameter>> = meta
            .params
            .iter()
            .filter_map(|p| {
                let param = parameter_from_doc(p);
                if param.is_reserved_header() {
                    debug!(name = %param.name, "dropping reserved header parameter");
                    None
                } else {
                    Some(RefOr::T(param))
                }
            })
            .collect();
        if !params.is_empty() {
            op.parameters = Some(params);
        }

        if let Some(body) = &meta.request_body {
            op.request_body = Some(RefOr::T(request_body_from_doc(body, &meta.encodings)));
        }

        let mut responses: Map<String, RefOr<Response>> = Map::new();
        for ret in &meta.returns {
            let mut response = Response::new();
            response.summary = ret.summary.clone();
            response.description = ret.description.clone();
            let schema_name = ret.schema.as_deref().or(ret.item_schema.as_deref());
            if schema_name.is_some() || ret.content_type.is_some() {
                let content_type = ret
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "application/json".to_string());
                let mut media = MediaType::new();
                if let Some(name) = ret.schema.as_deref() {
                    media.schema = Some(schema_ref_for(name));
                }
                if let Some(name) = ret.item_schema.as_deref() {
                    media.item_schema = Some(schema_ref_for(name));
                }
                if let Some(example) = &ret.example {
                    media.example = Some(parse_example(example));
                }
                let mut content = Map::new();
                content.insert(content_type, media);
                response.content = Some(content);
            }
            responses.insert(ret.status.clone(), RefOr::T(response));
        }
        for header in &meta.response_headers {
            let entry = responses
                .entry(header.status.clone())
                .or_insert_with(|| RefOr::T(Response::new()));
            if let RefOr::T(response) = entry {
                let headers = response.headers.get_or_insert_with(Map::new);
                let mut value = Header::new();
                value.description = header.description.clone();
                value.required = header.required;
                if let Some(name) = header.schema.as_deref() {
                    value.schema = Some(schema_ref_for(name));
                }
                headers.insert(header.name.clone(), RefOr::T(value));
            }
        }
        for link in &meta.links {
            let entry = responses
                .entry(link.status.clone())
                .or_insert_with(|| RefOr::T(Response::new()));
            if let RefOr::T(response) = entry {
                let links = response.links.get_or_insert_with(Map::new);
                let mut value = Link::new();
                value.operation_id = link.operation_id.clone();
                value.operation_ref = link.operation_ref.clone();
                value.description = link.description.clone();
                links.insert(link.name.clone(), RefOr::T(value));
            }
        }
        if !responses.is_empty() {
            op.responses = Some(responses);
        }

        if meta.route.is_some() {
            if !meta.security.is_empty() {
                op.security = Some(meta.security.iter().map(requirement_from_doc).collect());
            }
            if !meta.servers.is_empty() {
                let servers = meta
                    .servers
                    .iter()
                    .map(|s| {
                        let mut server = Server::new(s.url.clone());
                        server.description = s.description.clone();
                        server.name = s.name.clone();
                        server
                    })
                    .collect();
                op.servers = Some(servers);
            }
        }

        op
    }
}

/// Builds a schema handle for a type name: a primitive becomes an inline
/// typed schema, anything else a component reference.
pub fn schema_ref_for(name: &str) -> RefOr<Schema> {
    let bare = type_from_ref(name);
    match bare {
        "string" => RefOr::T(Schema::typed(SchemaType::String)),
        "integer" => RefOr::T(Schema::typed(SchemaType::Integer)),
        "number" => RefOr::T(Schema::typed(SchemaType::Number)),
        "boolean" => RefOr::T(Schema::typed(SchemaType::Boolean)),
        "object" => RefOr::T(Schema::typed(SchemaType::Object)),
        "null" => RefOr::T(Schema::typed(SchemaType::Null)),
        "array" => RefOr::T(Schema::Array(Box::new(crate::openapi::Array::new()))),
        _ => RefOr::Ref(Ref::from_schema_name(bare)),
    }
}

fn parameter_from_doc(doc: &ParamDoc) -> Parameter {
    let location = doc
        .location
        .as_deref()
        .and_then(ParameterIn::parse)
        .unwrap_or(ParameterIn::Query);
    let mut param = Parameter::new(doc.name.clone(), location);
    param.description = doc.description.clone();
    param.required = doc.required;
    param.deprecated = doc.deprecated;
    param.allow_empty_value = doc.allow_empty_value;
    param.style = doc.style.as_deref().and_then(ParameterStyle::parse);
    param.explode = doc.explode;
    param.allow_reserved = doc.allow_reserved;
    if let Some(example) = &doc.example {
        param.example = Some(parse_example(example));
    }

    let schema = if let Some(item) = doc.item_schema.as_deref() {
        let array = crate::openapi::Array::new().items(schema_ref_for(item));
        RefOr::T(Schema::Array(Box::new(array)))
    } else {
        let mut object = crate::openapi::Object::new().schema_type(SchemaType::String);
        if let Some(format) = &doc.format {
            object = object.format(format.clone());
        }
        RefOr::T(Schema::Object(Box::new(object)))
    };

    if let Some(content_type) = &doc.content_type {
        let mut content = Map::new();
        content.insert(content_type.clone(), MediaType::new().schema(schema));
        param = param.content(content);
    } else {
        param.schema = Some(schema);
    }
    param
}

fn request_body_from_doc(
    doc: &BodyDoc,
    encodings: &[crate::docmeta::EncodingDoc],
) -> RequestBody {
    let mut body = RequestBody::new();
    body.description = doc.description.clone();
    body.required = doc.required;

    let content_type = doc
        .content_type
        .clone()
        .unwrap_or_else(|| "application/json".to_string());
    let mut media = MediaType::new();
    if let Some(name) = doc.schema.as_deref() {
        media.schema = Some(schema_ref_for(name));
    }
    for encoding_doc in encodings {
        let mut encoding = Encoding::new();
        encoding.content_type = encoding_doc.content_type.clone();
        encoding.style = encoding_doc.style.clone();
        encoding.explode = encoding_doc.explode;
        encoding.allow_reserved = encoding_doc.allow_reserved;
        match &encoding_doc.target {
            EncodingTarget::Property(name) => {
                media
                    .encoding
                    .get_or_insert_with(Map::new)
                    .insert(name.clone(), encoding);
            }
            EncodingTarget::Prefix => {
                media.prefix_encoding.get_or_insert_with(Vec::new).push(encoding);
            }
            EncodingTarget::Item => {
                media.item_encoding = Some(Box::new(encoding));
            }
        }
    }

    let mut content = Map::new();
    content.insert(content_type, media);
    body.content = Some(content);
    body
}

fn requirement_from_doc(doc: &crate::docmeta::SecurityDoc) -> SecurityRequirement {
    let mut requirement = SecurityRequirement::new();
    requirement.insert(doc.name.clone(), doc.scopes.clone());
    requirement
}

fn scheme_from_doc(doc: &SchemeDoc) -> Result<SecurityScheme, Error> {
    let type_name = doc
        .scheme_type
        .as_deref()
        .ok_or_else(|| Error::InvalidArgument(format!("scheme {:?} without a type", doc.name)))?;
    let scheme_type = SecuritySchemeType::parse(type_name).ok_or_else(|| {
        Error::InvalidArgument(format!("unknown security scheme type {type_name:?}"))
    })?;

    let mut scheme = SecurityScheme::new(scheme_type);
    scheme.description = doc.description.clone();
    scheme.name = doc.param_name.clone();
    scheme.in_ = doc.location.as_deref().and_then(|loc| match loc {
        "query" => Some(ApiKeyLocation::Query),
        "header" => Some(ApiKeyLocation::Header),
        "cookie" => Some(ApiKeyLocation::Cookie),
        _ => None,
    });
    scheme.scheme = doc.http_scheme.clone();
    scheme.bearer_format = doc.bearer_format.clone();
    scheme.open_id_connect_url = doc.open_id_connect_url.clone();

    if !doc.flows.is_empty() {
        let mut flows = OauthFlows::new();
        for flow_doc in &doc.flows {
            let flow_type = OauthFlowType::parse(&flow_doc.flow_type).ok_or_else(|| {
                Error::InvalidArgument(format!("unknown OAuth flow type {:?}", flow_doc.flow_type))
            })?;
            *flows.slot_mut(flow_type) = Some(flow_from_doc(flow_doc));
        }
        scheme.flows = Some(flows);
    }
    Ok(scheme)
}

fn flow_from_doc(doc: &FlowDoc) -> OauthFlow {
    let mut flow = OauthFlow::new();
    flow.authorization_url = doc.authorization_url.clone();
    flow.token_url = doc.token_url.clone();
    flow.refresh_url = doc.refresh_url.clone();
    flow.device_authorization_url = doc.device_authorization_url.clone();
    for (name, description) in &doc.scopes {
        flow.scopes.insert(name.clone(), description.clone());
    }
    flow
}

fn merge_oauth_flow(existing: &mut OauthFlow, incoming: &OauthFlow) -> Result<(), Error> {
    merge_opt_scalar(
        "oauthFlow.authorizationUrl",
        &mut existing.authorization_url,
        &incoming.authorization_url,
    )?;
    merge_opt_scalar("oauthFlow.tokenUrl", &mut existing.token_url, &incoming.token_url)?;
    merge_opt_scalar(
        "oauthFlow.refreshUrl",
        &mut existing.refresh_url,
        &incoming.refresh_url,
    )?;
    merge_opt_scalar(
        "oauthFlow.deviceAuthorizationUrl",
        &mut existing.device_authorization_url,
        &incoming.device_authorization_url,
    )?;
    for (name, description) in &incoming.scopes {
        match existing.scopes.get(name) {
            None => {
                existing.scopes.insert(name.clone(), description.clone());
            }
            Some(old) if old.is_empty() && !description.is_empty() => {
                existing.scopes.insert(name.clone(), description.clone());
            }
            Some(old) => {
                if !description.is_empty() && old != description {
                    return Err(Error::conflict("oauthFlow.scopes", old.clone(), description));
                }
            }
        }
    }
    Ok(())
}

fn parse_example(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

/// First-set-wins for a mandatory scalar held as a (possibly empty) string.
fn set_scalar(field: &'static str, slot: &mut String, value: &str) -> Result<(), Error> {
    if slot.is_empty() {
        value.clone_into(slot);
        Ok(())
    } else if slot == value {
        Ok(())
    } else {
        Err(Error::conflict(field, slot.clone(), value))
    }
}

/// First-set-wins for an optional scalar.
fn set_opt_scalar(
    field: &'static str,
    slot: &mut Option<String>,
    value: &str,
) -> Result<(), Error> {
    match slot {
        None => {
            *slot = Some(value.to_string());
            Ok(())
        }
        Some(existing) if existing == value => Ok(()),
        Some(existing) => Err(Error::conflict(field, existing.clone(), value)),
    }
}

/// First-set-wins merge of two optional scalars.
fn merge_opt_scalar(
    field: &'static str,
    slot: &mut Option<String>,
    incoming: &Option<String>,
) -> Result<(), Error> {
    match incoming {
        None => Ok(()),
        Some(value) => set_opt_scalar(field, slot, value),
    }
}

/// Fills a description-like field when previously absent; never conflicts.
fn fill_opt(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none()
        && let Some(value) = value
    {
        *slot = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docmeta::{LicenseDoc, ReturnDoc, RouteDoc, ServerVarDoc};
    use crate::types::{FieldKind, StructField, StructFields};

    fn pet_route_meta() -> DocMetadata {
        let mut meta = DocMetadata::new();
        meta.route = Some(RouteDoc {
            verb: Some("GET".to_string()),
            path: "/pets/{id}".to_string(),
            webhook: false,
        });
        meta.params.push(ParamDoc {
            name: "id".to_string(),
            description: Some("Pet ID".to_string()),
            location: Some("path".to_string()),
            required: Some(true),
            ..Default::default()
        });
        meta.returns.push(ReturnDoc {
            status: "200".to_string(),
            description: Some("Single pet".to_string()),
            content_type: Some("application/json".to_string()),
            ..Default::default()
        });
        meta
    }

    #[test]
    fn add_operation_with_route_param_and_return_builds_path() {
        //* Given
        let mut spec = Spec::new();
        let meta = pet_route_meta();

        //* When
        spec.add_operation(&meta).expect("operation should aggregate");

        //* Then
        let item = spec
            .document
            .paths
            .get("/pets/{id}")
            .expect("path should exist");
        let op = item.get.as_ref().expect("GET operation should exist");
        let params = op.parameters.as_ref().expect("parameters should exist");
        assert_eq!(params.len(), 1, "one parameter expected");
        let RefOr::T(param) = &params[0] else {
            panic!("expected an inline parameter");
        };
        assert_eq!(param.name, "id");
        assert_eq!(param.in_, ParameterIn::Path);
        assert_eq!(param.required, Some(true), "path param must stay required");
        let responses = op.responses.as_ref().expect("responses should exist");
        let RefOr::T(response) = responses.get("200").expect("200 should exist") else {
            panic!("expected an inline response");
        };
        let content = response.content.as_ref().expect("content should exist");
        assert!(
            content.contains_key("application/json"),
            "content type should be preserved"
        );
    }

    #[test]
    fn add_operation_with_duplicate_verb_and_route_conflicts() {
        //* Given
        let mut spec = Spec::new();
        let meta = pet_route_meta();
        spec.add_operation(&meta).expect("first insertion succeeds");

        //* When
        let result = spec.add_operation(&meta);

        //* Then
        assert!(
            matches!(result, Err(Error::Conflict { .. })),
            "duplicate verb on the same route must conflict"
        );
    }

    #[test]
    fn register_types_is_first_wins_idempotent() {
        //* Given
        let mut spec = Spec::new();
        let mut fields = StructFields::new();
        fields
            .push(StructField::new("name", FieldKind::String))
            .expect("push succeeds");
        let def = TypeDefinition::Struct {
            name: "Pet".to_string(),
            fields,
        };

        //* When
        spec.register_types(vec![def.clone(), def.clone()]);
        spec.register_types(vec![def]);

        //* Then
        assert_eq!(spec.types.len(), 1, "same name registers exactly once");
    }

    #[test]
    fn apply_global_meta_with_mismatched_title_conflicts() {
        //* Given
        let mut spec = Spec::new();
        let mut first = DocMetadata::new();
        first.info.title = Some("Pet API".to_string());
        let mut second = DocMetadata::new();
        second.info.title = Some("Other API".to_string());

        //* When
        spec.apply_global_meta(&first).expect("first set wins");
        let result = spec.apply_global_meta(&second);

        //* Then
        assert!(
            matches!(result, Err(Error::Conflict { .. })),
            "a mismatched second title must conflict"
        );
    }

    #[test]
    fn apply_global_meta_license_identifier_and_url_are_exclusive() {
        //* Given
        let mut spec = Spec::new();
        let mut meta = DocMetadata::new();
        meta.license = Some(LicenseDoc {
            name: "Apache-2.0".to_string(),
            identifier: Some("Apache-2.0".to_string()),
            url: Some("https://www.apache.org/licenses/LICENSE-2.0".to_string()),
        });

        //* When
        let result = spec.apply_global_meta(&meta);

        //* Then
        assert!(
            matches!(result, Err(Error::InvalidArgument(_))),
            "identifier and url together must be rejected"
        );
    }

    #[test]
    fn apply_global_meta_server_url_with_query_is_rejected() {
        //* Given
        let mut spec = Spec::new();
        let mut meta = DocMetadata::new();
        meta.servers.push(ServerDoc {
            url: "https://api.example.com?v=1".to_string(),
            ..Default::default()
        });

        //* When
        let result = spec.apply_global_meta(&meta);

        //* Then
        assert!(
            matches!(result, Err(Error::InvalidArgument(_))),
            "server url with a query string must be rejected"
        );
    }

    #[test]
    fn apply_global_meta_server_variable_needs_default_in_enum() {
        //* Given
        let mut spec = Spec::new();
        let mut meta = DocMetadata::new();
        meta.servers.push(ServerDoc {
            url: "https://{region}.example.com".to_string(),
            variables: vec![ServerVarDoc {
                name: "region".to_string(),
                default: Some("mars".to_string()),
                enum_values: vec!["eu".to_string(), "us".to_string()],
                description: None,
            }],
            ..Default::default()
        });

        //* When
        let result = spec.apply_global_meta(&meta);

        //* Then
        assert!(
            matches!(result, Err(Error::InvalidArgument(_))),
            "a default outside the enum must be rejected"
        );
    }

    #[test]
    fn apply_doc_security_merges_disjoint_flows_and_rejects_conflicts() {
        //* Given
        let mut spec = Spec::new();
        let mut first = DocMetadata::new();
        first.security_schemes.push(SchemeDoc {
            name: "petAuth".to_string(),
            scheme_type: Some("oauth2".to_string()),
            flows: vec![FlowDoc {
                flow_type: "password".to_string(),
                token_url: Some("https://auth.example.com/token".to_string()),
                scopes: vec![("read".to_string(), "Read access".to_string())],
                ..Default::default()
            }],
            ..Default::default()
        });
        let mut second = DocMetadata::new();
        second.security_schemes.push(SchemeDoc {
            name: "petAuth".to_string(),
            scheme_type: Some("oauth2".to_string()),
            flows: vec![FlowDoc {
                flow_type: "clientCredentials".to_string(),
                token_url: Some("https://auth.example.com/token".to_string()),
                scopes: vec![("write".to_string(), "Write access".to_string())],
                ..Default::default()
            }],
            ..Default::default()
        });

        //* When
        spec.apply_doc_security(&first).expect("first scheme merges");
        spec.apply_doc_security(&second).expect("disjoint flows merge");

        //* Then
        let schemes = spec
            .document
            .components
            .as_ref()
            .and_then(|c| c.security_schemes.as_ref())
            .expect("schemes should exist");
        let flows = schemes
            .get("petAuth")
            .and_then(|s| s.flows.as_ref())
            .expect("flows should exist");
        assert!(flows.password.is_some(), "password flow kept");
        assert!(flows.client_credentials.is_some(), "clientCredentials merged in");

        //* When (conflicting tokenUrl on an existing flow)
        let mut third = DocMetadata::new();
        third.security_schemes.push(SchemeDoc {
            name: "petAuth".to_string(),
            scheme_type: Some("oauth2".to_string()),
            flows: vec![FlowDoc {
                flow_type: "password".to_string(),
                token_url: Some("https://elsewhere.example.com/token".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        let result = spec.apply_doc_security(&third);

        //* Then
        assert!(
            matches!(result, Err(Error::Conflict { .. })),
            "differing tokenUrl must conflict"
        );
    }

    #[test]
    fn type_from_ref_strips_to_last_segment() {
        //* Given / When / Then
        assert_eq!(type_from_ref("#/components/schemas/Pet"), "Pet");
        assert_eq!(type_from_ref("Pet"), "Pet");
        assert_eq!(type_from_ref("#/$defs/Toy"), "Toy");
        assert!(is_primitive_type("integer"), "integer is primitive");
        assert!(!is_primitive_type("Pet"), "Pet is not primitive");
    }
}
