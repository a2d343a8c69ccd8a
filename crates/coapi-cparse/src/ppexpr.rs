//! Constant-expression evaluator for `#if`/`#elif` conditions.
//!
//! Recursive descent over a token slice. Supports arithmetic, bitwise,
//! logical and comparison operators, `defined`, `__has_include`,
//! `__has_embed` (with `limit`/`prefix`/`suffix`/`if_empty` parameter
//! clauses) and `__has_c_attribute`. Parse errors yield zero with the error
//! flag set; division by zero silently yields zero.

use std::path::Path;

use tracing::debug;

use crate::{
    numlit::{self, NumericLiteral},
    preproc::PreprocContext,
    token::{Keyword, Token, TokenKind},
};

/// `__has_embed`: resource found with content.
const EMBED_FOUND: i64 = 1;
/// `__has_embed`: resource found but empty (or limited to zero).
const EMBED_EMPTY: i64 = 2;
/// `__has_embed`: resource not found.
const EMBED_NOT_FOUND: i64 = 0;

/// The outcome of evaluating a conditional expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOutcome {
    /// The computed value; zero when `error` is set.
    pub value: i64,
    /// Whether a parse error occurred.
    pub error: bool,
}

/// Evaluates a conditional expression over a directive line's tokens.
pub fn evaluate(
    tokens: &[Token],
    src: &str,
    ctx: &PreprocContext,
    current_dir: Option<&Path>,
) -> EvalOutcome {
    let mut parser = ExprParser {
        tokens,
        src,
        ctx,
        current_dir,
        pos: 0,
        error: false,
    };
    let value = parser.logical_or();
    parser.skip_trivia();
    if parser.pos < parser.tokens.len() {
        parser.error = true;
    }
    if parser.error {
        EvalOutcome {
            value: 0,
            error: true,
        }
    } else {
        EvalOutcome {
            value,
            error: false,
        }
    }
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    src: &'a str,
    ctx: &'a PreprocContext,
    current_dir: Option<&'a Path>,
    pos: usize,
    error: bool,
}

impl<'a> ExprParser<'a> {
    fn skip_trivia(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.kind.is_trivia())
        {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<&'a Token> {
        self.skip_trivia();
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        self.skip_trivia();
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) {
        if !self.eat(kind) {
            self.error = true;
        }
    }

    fn logical_or(&mut self) -> i64 {
        let mut lhs = self.logical_and();
        while self.eat(TokenKind::PipePipe) {
            let rhs = self.logical_and();
            lhs = i64::from(lhs != 0 || rhs != 0);
        }
        lhs
    }

    fn logical_and(&mut self) -> i64 {
        let mut lhs = self.bit_or();
        while self.eat(TokenKind::AmpAmp) {
            let rhs = self.bit_or();
            lhs = i64::from(lhs != 0 && rhs != 0);
        }
        lhs
    }

    fn bit_or(&mut self) -> i64 {
        let mut lhs = self.bit_xor();
        while self.eat(TokenKind::Pipe) {
            lhs |= self.bit_xor();
        }
        lhs
    }

    fn bit_xor(&mut self) -> i64 {
        let mut lhs = self.bit_and();
        while self.eat(TokenKind::Caret) {
            lhs ^= self.bit_and();
        }
        lhs
    }

    fn bit_and(&mut self) -> i64 {
        let mut lhs = self.equality();
        while self.eat(TokenKind::Amp) {
            lhs &= self.equality();
        }
        lhs
    }

    fn equality(&mut self) -> i64 {
        let mut lhs = self.relational();
        loop {
            if self.eat(TokenKind::EqEq) {
                lhs = i64::from(lhs == self.relational());
            } else if self.eat(TokenKind::BangEq) {
                lhs = i64::from(lhs != self.relational());
            } else {
                return lhs;
            }
        }
    }

    fn relational(&mut self) -> i64 {
        let mut lhs = self.shift();
        loop {
            if self.eat(TokenKind::Lt) {
                lhs = i64::from(lhs < self.shift());
            } else if self.eat(TokenKind::Gt) {
                lhs = i64::from(lhs > self.shift());
            } else if self.eat(TokenKind::Le) {
                lhs = i64::from(lhs <= self.shift());
            } else if self.eat(TokenKind::Ge) {
                lhs = i64::from(lhs >= self.shift());
            } else {
                return lhs;
            }
        }
    }

    fn shift(&mut self) -> i64 {
        let mut lhs = self.additive();
        loop {
            if self.eat(TokenKind::Shl) {
                let rhs = self.additive();
                lhs = if (0..64).contains(&rhs) {
                    lhs.wrapping_shl(rhs as u32)
                } else {
                    0
                };
            } else if self.eat(TokenKind::Shr) {
                let rhs = self.additive();
                lhs = if (0..64).contains(&rhs) {
                    lhs.wrapping_shr(rhs as u32)
                } else {
                    0
                };
            } else {
                return lhs;
            }
        }
    }

    fn additive(&mut self) -> i64 {
        let mut lhs = self.multiplicative();
        loop {
            if self.eat(TokenKind::Plus) {
                lhs = lhs.wrapping_add(self.multiplicative());
            } else if self.eat(TokenKind::Minus) {
                lhs = lhs.wrapping_sub(self.multiplicative());
            } else {
                return lhs;
            }
        }
    }

    fn multiplicative(&mut self) -> i64 {
        let mut lhs = self.unary();
        loop {
            if self.eat(TokenKind::Star) {
                lhs = lhs.wrapping_mul(self.unary());
            } else if self.eat(TokenKind::Slash) {
                let rhs = self.unary();
                lhs = if rhs == 0 { 0 } else { lhs.wrapping_div(rhs) };
            } else if self.eat(TokenKind::Percent) {
                let rhs = self.unary();
                lhs = if rhs == 0 { 0 } else { lhs.wrapping_rem(rhs) };
            } else {
                return lhs;
            }
        }
    }

    fn unary(&mut self) -> i64 {
        if self.eat(TokenKind::Bang) {
            i64::from(self.unary() == 0)
        } else if self.eat(TokenKind::Tilde) {
            !self.unary()
        } else if self.eat(TokenKind::Minus) {
            self.unary().wrapping_neg()
        } else if self.eat(TokenKind::Plus) {
            self.unary()
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> i64 {
        let Some(token) = self.bump() else {
            self.error = true;
            return 0;
        };
        match token.kind {
            TokenKind::Number => match numlit::decode(token.text(self.src)) {
                Ok(NumericLiteral::Int(int)) => int.value as i64,
                Ok(NumericLiteral::Float(_)) | Err(_) => {
                    self.error = true;
                    0
                }
            },
            TokenKind::Char => char_value(token.text(self.src)),
            TokenKind::LParen => {
                let value = self.logical_or();
                self.expect(TokenKind::RParen);
                value
            }
            TokenKind::Keyword(Keyword::True) => 1,
            TokenKind::Keyword(Keyword::False) => 0,
            TokenKind::Identifier => self.identifier(token.text(self.src)),
            _ => {
                self.error = true;
                0
            }
        }
    }

    fn identifier(&mut self, name: &str) -> i64 {
        match name {
            "defined" => self.defined_operator(),
            "__has_include" => self.has_include_operator(),
            "__has_embed" => self.has_embed_operator(),
            "__has_c_attribute" => self.has_c_attribute_operator(),
            _ => self.macro_value(name),
        }
    }

    /// `defined X` or `defined(X)`.
    fn defined_operator(&mut self) -> i64 {
        let parens = self.eat(TokenKind::LParen);
        let Some(token) = self.bump() else {
            self.error = true;
            return 0;
        };
        let value = match token.kind {
            TokenKind::Identifier | TokenKind::Keyword(_) => {
                i64::from(self.ctx.macros.is_defined(token.text(self.src)))
            }
            _ => {
                self.error = true;
                0
            }
        };
        if parens {
            self.expect(TokenKind::RParen);
        }
        value
    }

    fn has_include_operator(&mut self) -> i64 {
        self.expect(TokenKind::LParen);
        let resolved = self.header_name().map(|(spelled, angled)| {
            self.ctx
                .resolve_include(&spelled, angled, self.current_dir)
        });
        self.expect(TokenKind::RParen);
        match resolved {
            Some(Some(_)) => 1,
            Some(None) => 0,
            None => {
                self.error = true;
                0
            }
        }
    }

    fn has_embed_operator(&mut self) -> i64 {
        self.expect(TokenKind::LParen);
        let Some((spelled, angled)) = self.header_name() else {
            self.error = true;
            return 0;
        };

        // Optional parameter clauses: `limit(n)`, `prefix(...)`,
        // `suffix(...)`, `if_empty(...)`. Only `limit` affects the result.
        let mut limit: Option<i64> = None;
        loop {
            let Some(token) = self.peek() else { break };
            if token.kind == TokenKind::RParen {
                break;
            }
            let Some(clause) = self.bump() else { break };
            if clause.kind != TokenKind::Identifier {
                self.error = true;
                break;
            }
            let clause_name = clause.text(self.src).to_string();
            if self.eat(TokenKind::LParen) {
                if clause_name == "limit" {
                    limit = Some(self.logical_or());
                } else {
                    self.skip_balanced_parens();
                }
                self.expect(TokenKind::RParen);
            }
        }
        self.expect(TokenKind::RParen);

        let resolved = self
            .ctx
            .resolve_include(&spelled, angled, self.current_dir);
        match resolved {
            None => EMBED_NOT_FOUND,
            Some(path) => {
                let empty = limit == Some(0)
                    || std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
                if empty { EMBED_EMPTY } else { EMBED_FOUND }
            }
        }
    }

    /// `__has_c_attribute(attr)` with the standard date-stamp values.
    fn has_c_attribute_operator(&mut self) -> i64 {
        self.expect(TokenKind::LParen);
        let mut name = None;
        let mut vendor = false;
        loop {
            let Some(token) = self.peek() else {
                self.error = true;
                break;
            };
            match token.kind {
                TokenKind::RParen => break,
                TokenKind::ColonColon => {
                    vendor = true;
                    self.pos += 1;
                }
                TokenKind::Identifier | TokenKind::Keyword(_) => {
                    name = Some(token.text(self.src).to_string());
                    self.pos += 1;
                }
                _ => {
                    self.error = true;
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);

        if vendor {
            return 0;
        }
        let Some(name) = name else {
            self.error = true;
            return 0;
        };
        attribute_stamp(&name)
    }

    /// Reads a `"name"` or `<name>` header spelling.
    fn header_name(&mut self) -> Option<(String, bool)> {
        let token = self.bump()?;
        match token.kind {
            TokenKind::String => Some((
                token.text(self.src).trim_matches('"').to_string(),
                false,
            )),
            TokenKind::Lt => {
                let start = token.end();
                loop {
                    let candidate = self.bump()?;
                    if candidate.kind == TokenKind::Gt {
                        return Some((self.src[start..candidate.start].trim().to_string(), true));
                    }
                }
            }
            _ => None,
        }
    }

    /// Skips a balanced parenthesized region; the cursor sits just before
    /// the closing parenthesis on return.
    fn skip_balanced_parens(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// An ordinary identifier: the first macro definition's replacement
    /// parsed as a C integer literal (base by prefix), else zero.
    fn macro_value(&mut self, name: &str) -> i64 {
        let Some(def) = self.ctx.macros.lookup(name) else {
            debug!(name, "undefined identifier evaluates to 0");
            return 0;
        };
        match numlit::decode(def.replacement.trim()) {
            Ok(NumericLiteral::Int(int)) => int.value as i64,
            _ => 0,
        }
    }
}

/// The `__has_c_attribute` date stamps defined by the standard.
fn attribute_stamp(name: &str) -> i64 {
    let bare = name
        .strip_prefix("__")
        .and_then(|n| n.strip_suffix("__"))
        .unwrap_or(name);
    match bare {
        "deprecated" | "nodiscard" | "fallthrough" | "maybe_unused" => 201904,
        "noreturn" | "_Noreturn" => 202202,
        "unsequenced" | "reproducible" => 202311,
        _ => 0,
    }
}

/// The numeric value of a simple character literal.
fn char_value(text: &str) -> i64 {
    let inner = text.trim_matches('\'');
    let mut chars = inner.chars();
    match (chars.next(), inner.starts_with('\\')) {
        (Some('\\'), _) => match chars.next() {
            Some('n') => 10,
            Some('t') => 9,
            Some('r') => 13,
            Some('0') => 0,
            Some(c) => c as i64,
            None => 0,
        },
        (Some(c), false) => c as i64,
        _ => 0,
    }
}
