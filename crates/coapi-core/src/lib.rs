//! # coapi-core
//!
//! Intermediate model and aggregator for coapi - the C ↔ OpenAPI bridge.
//!
//! This crate provides the OpenAPI 3.x document model, the C-shaped type and
//! doc-metadata records produced by source inspection, and the aggregator that
//! merges per-file inputs into one document with deduplication and conflict
//! detection.

pub mod aggregate;
pub mod docmeta;
mod error;
pub mod openapi;
pub mod types;

// Re-export main types at the crate root for convenience
pub use self::{
    aggregate::{PRIMITIVE_TYPES, Spec, is_primitive_type, schema_ref_for, type_from_ref},
    docmeta::DocMetadata,
    error::Error,
    openapi::{
        ApiKeyLocation, Array, Components, Contact, DEFAULT_OPENAPI_VERSION, Discriminator,
        Encoding, Example, Extensions, ExternalDocs, Header, HttpMethod, Info, License, Link, Map,
        MediaType, OauthFlow, OauthFlowType, OauthFlows, Object, OpenApi, Operation, Parameter,
        ParameterIn, ParameterStyle, PathItem, Paths, Ref, RefOr, RequestBody, Response, Schema,
        SchemaType, SecurityRequirement, SecurityScheme, SecuritySchemeType, Server,
        ServerVariable, Tag, Xml,
    },
    types::{
        Constraints, FieldKind, JsonShape, MAX_FIELD_NAME, StructField, StructFields, TypeDefList,
        TypeDefinition, UnionVariantMeta,
    },
};
