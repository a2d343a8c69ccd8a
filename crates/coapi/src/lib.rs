//! # coapi
//!
//! A bidirectional bridge between C source code and OpenAPI 3.x documents.
//!
//! Annotated C functions (`@route`, `@param`, `@return`, ...) become a formal
//! OpenAPI document; a JSON Schema or OpenAPI document becomes idiomatic C
//! headers and sources with lifecycle, equality, JSON codecs and
//! tagged-union dispatch.
//!
//! This facade re-exports the model ([`coapi_core`]), the source inspector
//! ([`coapi_cparse`]) and the emitters ([`coapi_codegen`]), and adds the
//! directory pipeline tying them together.

pub mod pipeline;

pub use coapi_codegen::{
    DocsOptions, EmitError, build_document, emit_docs_json, emit_header, emit_json, emit_source,
    load_schemas, schema_from_typedef, write_c_files,
};
pub use coapi_core::{
    DocMetadata, Error, OpenApi, Spec, TypeDefinition, is_primitive_type, type_from_ref,
};
pub use coapi_cparse::{
    ParseError, PreprocContext, ResolvedInclude, Token, TokenKind, TokenList, collect_doc_blocks,
    extract_types, parse_block, scan_source, tokenize,
};

pub use self::pipeline::{PipelineError, ensure_info_defaults, scan_dir, scan_dir_into};
