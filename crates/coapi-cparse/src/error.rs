//! Error type for source inspection.

/// The deepest accepted `#if` nesting.
pub const MAX_CONDITIONAL_DEPTH: usize = 64;

/// Errors reported while inspecting C source.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A constant expression could not be parsed.
    #[error("malformed expression: {0}")]
    Expr(String),

    /// A doc directive was malformed beyond recovery.
    #[error("malformed directive: {0}")]
    Directive(String),

    /// A declaration or signature could not be recognized.
    #[error("malformed declaration: {0}")]
    Declaration(String),

    /// A designated initializer could not be parsed.
    #[error("malformed initializer: {0}")]
    Initializer(String),

    /// Conditional nesting exceeded [`MAX_CONDITIONAL_DEPTH`].
    #[error("conditional nesting exceeds {MAX_CONDITIONAL_DEPTH} levels")]
    DepthExceeded,

    /// A numeric literal was malformed.
    #[error("malformed numeric literal: {0}")]
    Numeric(String),

    /// A source file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A model-level constraint was violated.
    #[error(transparent)]
    Model(#[from] coapi_core::Error),
}
