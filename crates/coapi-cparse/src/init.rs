//! Designated-initializer parsing.
//!
//! Recursive descent over `{ .name = expr, [i] = { ... }, expr, ... }`.
//! Designators and scalar expressions are re-joined from tokens with
//! whitespace and comments stripped; nested brace groups recurse into child
//! lists. Construction is scoped, so a parse error simply drops the partial
//! value.

use crate::{
    error::ParseError,
    token::{Token, TokenKind},
};

/// A parsed initializer list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitList {
    /// The entries, in source order.
    pub entries: Vec<InitEntry>,
}

/// One initializer entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitEntry {
    /// The designator text (`.name`, `[3]`, `.a.b[0]`), when present.
    pub designator: Option<String>,
    /// The initializer value.
    pub value: InitValue,
}

/// A scalar expression or a nested list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitValue {
    /// A scalar expression, tokens joined without whitespace.
    Scalar(String),
    /// A nested brace group.
    List(InitList),
}

/// Parses a braced initializer from a token range. The range must begin at
/// the opening `{` (leading trivia is tolerated).
pub fn parse_init(tokens: &[Token], src: &str) -> Result<InitList, ParseError> {
    let significant: Vec<&Token> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
    let mut pos = 0usize;
    let list = parse_list(&significant, src, &mut pos)?;
    Ok(list)
}

fn parse_list(tokens: &[&Token], src: &str, pos: &mut usize) -> Result<InitList, ParseError> {
    expect(tokens, pos, TokenKind::LBrace)?;
    let mut list = InitList::default();

    loop {
        match tokens.get(*pos) {
            None => return Err(ParseError::Initializer("unterminated brace group".into())),
            Some(token) if token.kind == TokenKind::RBrace => {
                *pos += 1;
                return Ok(list);
            }
            Some(_) => {}
        }

        let designator = parse_designator(tokens, src, pos)?;
        let value = if tokens.get(*pos).is_some_and(|t| t.kind == TokenKind::LBrace) {
            InitValue::List(parse_list(tokens, src, pos)?)
        } else {
            InitValue::Scalar(parse_scalar(tokens, src, pos)?)
        };
        list.entries.push(InitEntry { designator, value });

        // A separating comma; a trailing comma before `}` is fine.
        if tokens.get(*pos).is_some_and(|t| t.kind == TokenKind::Comma) {
            *pos += 1;
        }
    }
}

/// Parses an optional designator chain followed by `=`.
///
/// Without a terminating `=` the tokens belong to the value, so the cursor
/// rewinds and `None` is returned.
fn parse_designator(
    tokens: &[&Token],
    src: &str,
    pos: &mut usize,
) -> Result<Option<String>, ParseError> {
    let start = *pos;
    let mut text = String::new();

    loop {
        match tokens.get(*pos).map(|t| t.kind) {
            Some(TokenKind::Dot) => {
                *pos += 1;
                let Some(name) = tokens.get(*pos).filter(|t| t.kind == TokenKind::Identifier)
                else {
                    *pos = start;
                    return Ok(None);
                };
                text.push('.');
                text.push_str(name.text(src));
                *pos += 1;
            }
            Some(TokenKind::LBracket) => {
                *pos += 1;
                text.push('[');
                let mut depth = 0usize;
                loop {
                    let Some(token) = tokens.get(*pos) else {
                        return Err(ParseError::Initializer("unterminated designator".into()));
                    };
                    match token.kind {
                        TokenKind::LBracket => depth += 1,
                        TokenKind::RBracket => {
                            if depth == 0 {
                                *pos += 1;
                                break;
                            }
                            depth -= 1;
                        }
                        _ => {}
                    }
                    text.push_str(token.text(src));
                    *pos += 1;
                }
                text.push(']');
            }
            _ => break,
        }
    }

    if text.is_empty() {
        return Ok(None);
    }
    if tokens.get(*pos).is_some_and(|t| t.kind == TokenKind::Assign) {
        *pos += 1;
        Ok(Some(text))
    } else {
        // Not a designator after all (e.g. a plain `.5` expression).
        *pos = start;
        Ok(None)
    }
}

/// Scans a scalar expression until a comma or brace closer at balance zero,
/// joining token texts with whitespace and comments stripped.
fn parse_scalar(tokens: &[&Token], src: &str, pos: &mut usize) -> Result<String, ParseError> {
    let mut text = String::new();
    let mut parens = 0usize;
    let mut brackets = 0usize;
    let mut braces = 0usize;

    loop {
        let Some(token) = tokens.get(*pos) else {
            break;
        };
        match token.kind {
            TokenKind::Comma if parens == 0 && brackets == 0 && braces == 0 => break,
            TokenKind::RBrace if braces == 0 => break,
            TokenKind::LParen => parens += 1,
            TokenKind::RParen => {
                if parens == 0 {
                    return Err(ParseError::Initializer("unbalanced parenthesis".into()));
                }
                parens -= 1;
            }
            TokenKind::LBracket => brackets += 1,
            TokenKind::RBracket => {
                if brackets == 0 {
                    return Err(ParseError::Initializer("unbalanced bracket".into()));
                }
                brackets -= 1;
            }
            TokenKind::LBrace => braces += 1,
            TokenKind::RBrace => braces -= 1,
            _ => {}
        }
        text.push_str(token.text(src));
        *pos += 1;
    }

    if text.is_empty() {
        return Err(ParseError::Initializer("empty initializer value".into()));
    }
    Ok(text)
}

fn expect(tokens: &[&Token], pos: &mut usize, kind: TokenKind) -> Result<(), ParseError> {
    match tokens.get(*pos) {
        Some(token) if token.kind == kind => {
            *pos += 1;
            Ok(())
        }
        _ => Err(ParseError::Initializer(format!("expected {kind:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn parse(src: &str) -> InitList {
        let list = tokenize(src);
        parse_init(list.tokens(), list.source()).expect("initializer should parse")
    }

    #[test]
    fn parse_designated_scalars_and_positional_values() {
        //* Given
        let src = "{ .name = \"rex\", .age = 3 + 4, 42 }";

        //* When
        let init = parse(src);

        //* Then
        assert_eq!(init.entries.len(), 3);
        assert_eq!(init.entries[0].designator.as_deref(), Some(".name"));
        assert_eq!(
            init.entries[0].value,
            InitValue::Scalar("\"rex\"".to_string())
        );
        assert_eq!(init.entries[1].designator.as_deref(), Some(".age"));
        assert_eq!(init.entries[1].value, InitValue::Scalar("3+4".to_string()));
        assert_eq!(init.entries[2].designator, None);
        assert_eq!(init.entries[2].value, InitValue::Scalar("42".to_string()));
    }

    #[test]
    fn parse_nested_groups_recurse() {
        //* Given
        let src = "{ [2] = { .x = 1, .y = 2 }, [5] = 9 }";

        //* When
        let init = parse(src);

        //* Then
        assert_eq!(init.entries.len(), 2);
        assert_eq!(init.entries[0].designator.as_deref(), Some("[2]"));
        let InitValue::List(nested) = &init.entries[0].value else {
            panic!("expected nested list");
        };
        assert_eq!(nested.entries.len(), 2);
        assert_eq!(nested.entries[0].designator.as_deref(), Some(".x"));
        assert_eq!(init.entries[1].designator.as_deref(), Some("[5]"));
    }

    #[test]
    fn parse_scalar_keeps_balanced_commas() {
        //* Given
        let src = "{ .total = add(1, 2), .pair = (struct P){1, 2} }";

        //* When
        let init = parse(src);

        //* Then
        assert_eq!(init.entries.len(), 2);
        assert_eq!(
            init.entries[0].value,
            InitValue::Scalar("add(1,2)".to_string()),
            "commas inside calls stay in the expression"
        );
    }

    #[test]
    fn parse_strips_comments_from_joined_text() {
        //* Given
        let src = "{ .flag = /* keep? */ 1 }";

        //* When
        let init = parse(src);

        //* Then
        assert_eq!(init.entries[0].value, InitValue::Scalar("1".to_string()));
    }

    #[test]
    fn parse_unterminated_group_is_an_error() {
        //* Given
        let src = "{ .a = 1, ";

        //* When
        let list = tokenize(src);
        let result = parse_init(list.tokens(), list.source());

        //* Then
        assert!(
            matches!(result, Err(ParseError::Initializer(_))),
            "missing closing brace must fail"
        );
    }
}
