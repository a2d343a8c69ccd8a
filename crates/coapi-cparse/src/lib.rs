//! # coapi-cparse
//!
//! C source inspection for coapi: a single-pass tokenizer, a preprocessor
//! evaluator (includes, macros, conditionals, constant expressions), the C
//! inspector (numeric literals, type definitions, function signatures,
//! designated initializers) and the doc-directive parser.
//!
//! The parser is heuristic by design: it recovers declarations and
//! structured doc metadata from real-world source without attempting full
//! semantic analysis.

pub mod docdir;
mod error;
pub mod func;
pub mod init;
pub mod numlit;
pub mod ppexpr;
pub mod preproc;
pub mod token;
pub mod tokenizer;
pub mod typedefs;

pub use self::{
    docdir::{collect_doc_blocks, parse_block},
    error::{MAX_CONDITIONAL_DEPTH, ParseError},
    func::{FunctionSig, parse_signature, rewrite_error_returning},
    init::{InitEntry, InitList, InitValue, parse_init},
    numlit::{DecimalKind, FloatLiteral, IntLiteral, NumericLiteral},
    ppexpr::{EvalOutcome, evaluate},
    preproc::{MacroDef, MacroTable, PreprocContext, ResolvedInclude, scan_file, scan_source},
    token::{Keyword, Token, TokenKind, TokenList},
    tokenizer::tokenize,
    typedefs::extract_types,
};
