//! The source-tree pipeline: walk, tokenize, preprocess, inspect, aggregate.
//!
//! Files are visited in a stable order; per-file parse artifacts are dropped
//! before the next file is processed. The preprocessor context threads the
//! macro table across the tree so conditional diagnostics see every
//! definition; the aggregated [`Spec`] owns all of its strings.

use std::{
    ops::ControlFlow,
    path::{Path, PathBuf},
};

use coapi_core::Spec;
use coapi_cparse::{ParseError, PreprocContext, collect_doc_blocks, extract_types, tokenize};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Errors reported by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A source file could not be inspected.
    #[error("{path}: {source}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// The underlying parse failure.
        source: ParseError,
    },

    /// Aggregation rejected the file's metadata.
    #[error("{path}: {source}")]
    Aggregate {
        /// The offending file.
        path: PathBuf,
        /// The underlying merge failure.
        source: coapi_core::Error,
    },

    /// The directory walk failed.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// A file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// True for the C source and header files the pipeline inspects.
fn is_c_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("c" | "h")
    )
}

/// Scans a source tree into a fresh spec.
pub fn scan_dir(dir: &Path) -> Result<Spec, PipelineError> {
    let mut spec = Spec::new();
    scan_dir_into(&mut spec, dir)?;
    Ok(spec)
}

/// Scans a source tree into an existing spec (merge-onto-base).
pub fn scan_dir_into(spec: &mut Spec, dir: &Path) -> Result<(), PipelineError> {
    let mut ctx = PreprocContext::with_search_paths(vec![dir.to_path_buf()]);

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_c_source(entry.path()) {
            continue;
        }
        scan_file_into(spec, &mut ctx, entry.path())?;
    }
    Ok(())
}

/// Scans one source file: directive lines first (macro table, include
/// diagnostics), then type definitions and annotated comment blocks.
pub fn scan_file_into(
    spec: &mut Spec,
    ctx: &mut PreprocContext,
    path: &Path,
) -> Result<(), PipelineError> {
    let source = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = source.len(), "inspecting source file");

    coapi_cparse::scan_source(ctx, &source, path.parent(), &mut |include| {
        debug!(
            from = %path.display(),
            include = %include.resolved.display(),
            "resolved include"
        );
        ControlFlow::Continue(())
    })
    .map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let tokens = tokenize(&source);

    let types = extract_types(&tokens).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    spec.register_types(types);

    for block in collect_doc_blocks(&tokens) {
        let meta = match coapi_cparse::parse_block(&block) {
            Ok(meta) => meta,
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping malformed doc block");
                continue;
            }
        };

        let fold = |source| PipelineError::Aggregate {
            path: path.to_path_buf(),
            source,
        };
        if let Some(route) = &meta.route {
            if route.webhook {
                spec.add_webhook_operation(&meta).map_err(fold)?;
            } else {
                spec.add_operation(&meta).map_err(fold)?;
            }
        }
        spec.apply_global_meta(&meta).map_err(fold)?;
        spec.apply_doc_security(&meta).map_err(fold)?;
    }

    Ok(())
}

/// Fills in the mandatory info fields when no directive set them, so the
/// emitted document stays structurally valid.
pub fn ensure_info_defaults(spec: &mut Spec, fallback_title: &str) {
    if spec.document.info.title.is_empty() {
        spec.document.info.title = fallback_title.to_string();
    }
    if spec.document.info.version.is_empty() {
        spec.document.info.version = "1.0.0".to_string();
    }
}
