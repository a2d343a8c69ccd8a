//! # coapi-codegen
//!
//! Code emitters for coapi: the C data-class generator (header/source pairs
//! with JSON codecs, lifecycle, equality and tagged-union dispatch), the
//! schema-document loader, the OpenAPI JSON writer and the per-operation
//! docs catalog.

pub mod ctype;
pub mod docs_json;
mod error;
pub mod header;
pub mod openapi_out;
pub mod schema_load;
pub mod source;

use std::path::{Path, PathBuf};

use coapi_core::TypeDefinition;

pub use self::{
    docs_json::{DocsOptions, emit_docs_json},
    error::EmitError,
    header::emit_header,
    openapi_out::{build_document, emit_json, schema_from_typedef},
    schema_load::load_schemas,
    source::emit_source,
};

/// Emits the `<base>.h`/`<base>.c` pair into a directory, returning the
/// written paths.
pub fn write_c_files(
    types: &[TypeDefinition],
    dir: &Path,
    base: &str,
) -> Result<(PathBuf, PathBuf), EmitError> {
    let header = emit_header(types, base)?;
    let source = emit_source(types, base)?;

    let header_path = dir.join(format!("{base}.h"));
    let source_path = dir.join(format!("{base}.c"));
    std::fs::write(&header_path, header)?;
    std::fs::write(&source_path, source)?;
    Ok((header_path, source_path))
}
