//! Error type shared by the model and the aggregator.

/// Errors reported by model construction and aggregation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller passed an empty or malformed value where an identifier,
    /// route or URL was required.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two sources set a mergeable field to incompatible values.
    #[error("conflict merging {field}: {existing:?} vs {incoming:?}")]
    Conflict {
        /// The document field in disagreement.
        field: &'static str,
        /// The value already registered.
        existing: String,
        /// The value the second source supplied.
        incoming: String,
    },

    /// A referenced name did not resolve to a registered schema or primitive.
    #[error("unresolved reference: {0}")]
    NotFound(String),

    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON document could not be produced or consumed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Conflict`] over string values.
    pub fn conflict(
        field: &'static str,
        existing: impl Into<String>,
        incoming: impl Into<String>,
    ) -> Self {
        Error::Conflict {
            field,
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }
}
