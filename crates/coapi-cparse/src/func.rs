//! Function-signature extraction and the error-returning rewrite.
//!
//! Locates the function name as the last identifier before the outermost
//! `(`, and captures attributes, storage specifiers, return type, argument
//! list and trailing K&R declarations. The rewriter produces the
//! "all errors returned" form: the return value moves to an out-parameter
//! and the function returns an `int` status.

use crate::{
    error::ParseError,
    token::{Keyword, Token, TokenKind},
};

/// A parsed function signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionSig {
    /// `[[...]]` attribute groups, verbatim.
    pub attributes: Vec<String>,
    /// Storage and function specifiers, in order.
    pub storage: Vec<String>,
    /// The return type text.
    pub return_type: String,
    /// The function name.
    pub name: String,
    /// The parameter declarations, one per comma at paren depth zero.
    pub params: Vec<String>,
    /// Trailing K&R parameter declarations.
    pub kr_decls: Vec<String>,
}

const STORAGE_KEYWORDS: &[Keyword] = &[
    Keyword::Static,
    Keyword::Extern,
    Keyword::Inline,
    Keyword::Register,
    Keyword::Auto,
    Keyword::Noreturn,
    Keyword::UNoreturn,
    Keyword::ThreadLocal,
    Keyword::UThreadLocal,
];

/// Parses a candidate signature token range.
pub fn parse_signature(tokens: &[Token], src: &str) -> Result<FunctionSig, ParseError> {
    let significant: Vec<&Token> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
    let mut sig = FunctionSig::default();
    let mut idx = 0;

    // Leading `[[ ... ]]` attribute groups.
    while idx + 1 < significant.len()
        && significant[idx].kind == TokenKind::LBracket
        && significant[idx + 1].kind == TokenKind::LBracket
    {
        let start = significant[idx].start;
        let mut depth = 0usize;
        let mut end = idx;
        for (cursor, token) in significant.iter().enumerate().skip(idx) {
            match token.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        end = cursor;
                        break;
                    }
                }
                _ => {}
            }
        }
        if end == idx {
            return Err(ParseError::Declaration("unterminated attribute".into()));
        }
        sig.attributes
            .push(src[start..significant[end].end()].to_string());
        idx = end + 1;
    }

    // Storage and function specifiers.
    while idx < significant.len() {
        let TokenKind::Keyword(keyword) = significant[idx].kind else {
            break;
        };
        if !STORAGE_KEYWORDS.contains(&keyword) {
            break;
        }
        sig.storage.push(significant[idx].text(src).to_string());
        idx += 1;
    }

    // The parameter list opens at the first `(` whose preceding significant
    // token is the function name identifier.
    let open_idx = significant[idx..]
        .iter()
        .position(|t| t.kind == TokenKind::LParen)
        .map(|offset| idx + offset)
        .ok_or_else(|| ParseError::Declaration("no parameter list".into()))?;
    let name_idx = significant[..open_idx]
        .iter()
        .rposition(|t| t.kind == TokenKind::Identifier)
        .ok_or_else(|| ParseError::Declaration("no function name".into()))?;
    if name_idx < idx {
        return Err(ParseError::Declaration("no function name".into()));
    }
    sig.name = significant[name_idx].text(src).to_string();
    sig.return_type = join_tokens(&significant[idx..name_idx], src);
    if sig.return_type.is_empty() {
        sig.return_type = "int".to_string();
    }

    // Balanced argument list.
    let mut depth = 0usize;
    let mut close_idx = open_idx;
    let mut current: Vec<&Token> = Vec::new();
    let mut params = Vec::new();
    for (cursor, &token) in significant.iter().enumerate().skip(open_idx) {
        match token.kind {
            TokenKind::LParen => {
                depth += 1;
                if depth > 1 {
                    current.push(token);
                }
                continue;
            }
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    close_idx = cursor;
                    if !current.is_empty() {
                        params.push(join_tokens(&current, src));
                    }
                    break;
                }
                current.push(token);
                continue;
            }
            TokenKind::Comma if depth == 1 => {
                params.push(join_tokens(&current, src));
                current.clear();
                continue;
            }
            _ => current.push(token),
        }
    }
    if depth != 0 {
        return Err(ParseError::Declaration("unbalanced parameter list".into()));
    }
    sig.params = params;

    // Trailing K&R declarations run until the body or a terminator.
    let mut kr: Vec<&Token> = Vec::new();
    for &token in significant.iter().skip(close_idx + 1) {
        match token.kind {
            TokenKind::LBrace => break,
            TokenKind::Semicolon => {
                if !kr.is_empty() {
                    sig.kr_decls.push(join_tokens(&kr, src));
                    kr.clear();
                }
            }
            _ => kr.push(token),
        }
    }
    if !kr.is_empty() {
        sig.kr_decls.push(join_tokens(&kr, src));
    }

    Ok(sig)
}

/// The "all errors returned" rewrite of a signature.
///
/// `void f(...)` canonicalizes to `int f(...)`; a non-void return type `T`
/// becomes a trailing `T *out` parameter. The status `int` carries the
/// error code.
pub fn rewrite_error_returning(sig: &FunctionSig) -> String {
    let returns_void = sig.return_type == "void";
    let mut params: Vec<String> = sig
        .params
        .iter()
        .filter(|p| p.as_str() != "void")
        .cloned()
        .collect();
    if !returns_void {
        let spacer = if sig.return_type.ends_with('*') { "" } else { " " };
        params.push(format!("{}{}*out", sig.return_type, spacer));
    }

    let params_text = if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    };

    let mut prefix = sig.storage.join(" ");
    if !prefix.is_empty() {
        prefix.push(' ');
    }
    format!("{}int {}({})", prefix, sig.name, params_text)
}

/// Joins token texts with single spaces, then tightens the usual C
/// punctuation so the result reads like hand-written source.
fn join_tokens(tokens: &[&Token], src: &str) -> String {
    let mut out = String::new();
    for token in tokens {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token.text(src));
    }
    out.replace(" ,", ",")
        .replace(" ;", ";")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(" [", "[")
        .replace("[ ", "[")
        .replace(" ]", "]")
}
