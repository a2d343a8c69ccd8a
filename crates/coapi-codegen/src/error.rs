//! Error type for the emitters.

/// Errors reported while loading schemas or emitting code.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// A referenced type name resolved to neither a registered schema nor a
    /// primitive logical type.
    #[error("unresolved reference: {0}")]
    Unresolved(String),

    /// The input document is not a recognizable schema collection.
    #[error("unsupported schema document: {0}")]
    UnsupportedDocument(String),

    /// A generated construct cannot be expressed.
    #[error("cannot emit: {0}")]
    Unsupported(String),

    /// Formatting into the output buffer failed.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),

    /// Writing an output file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON document could not be produced or consumed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A model-level failure.
    #[error(transparent)]
    Model(#[from] coapi_core::Error),
}
