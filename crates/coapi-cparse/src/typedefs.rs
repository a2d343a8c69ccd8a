//! Type-definition extraction: `struct NAME { ... };` and `enum NAME { ... };`
//! blocks recovered from a token stream.
//!
//! Struct bodies are parsed into logical fields with the C-to-schema type
//! mapping; nested brace groups are skipped by depth tracking. The parser is
//! heuristic by design and ignores declarations it cannot recognize.

use coapi_core::{FieldKind, StructField, StructFields, TypeDefList, TypeDefinition};
use tracing::debug;

use crate::{
    error::ParseError,
    token::{Keyword, Token, TokenKind, TokenList},
};

/// Integer-like C type keywords and common typedef spellings.
const INTEGER_TYPES: &[&str] = &[
    "int", "long", "short", "signed", "unsigned", "char", "size_t", "ssize_t", "ptrdiff_t",
    "intmax_t", "uintmax_t", "intptr_t", "uintptr_t",
];

/// Scans a token stream for type definitions, in source order.
pub fn extract_types(list: &TokenList<'_>) -> Result<TypeDefList, ParseError> {
    let src = list.source();
    let tokens = list.tokens();
    let mut defs = TypeDefList::new();
    let mut idx = 0;

    while idx < tokens.len() {
        let token = &tokens[idx];
        let tag = match token.kind {
            TokenKind::Keyword(Keyword::Struct) => Some(true),
            TokenKind::Keyword(Keyword::Enum) => Some(false),
            _ => None,
        };
        let Some(is_struct) = tag else {
            idx += 1;
            continue;
        };

        let Some((name_idx, name)) = next_identifier(tokens, src, idx + 1) else {
            idx += 1;
            continue;
        };
        let Some(open_idx) = next_significant(tokens, name_idx + 1)
            .filter(|&i| tokens[i].kind == TokenKind::LBrace)
        else {
            // A reference like `struct Foo *p;`, not a definition.
            idx += 1;
            continue;
        };
        let Some(close_idx) = matching_brace(tokens, open_idx) else {
            debug!(name, "unterminated type definition; stopping extraction");
            break;
        };

        let body = &tokens[open_idx + 1..close_idx];
        let def = if is_struct {
            let fields = parse_struct_body(body, src)?;
            TypeDefinition::Struct {
                name: name.to_string(),
                fields,
            }
        } else {
            TypeDefinition::Enum {
                name: name.to_string(),
                members: parse_enum_body(body, src),
            }
        };
        defs.push(def);
        idx = close_idx + 1;
    }

    Ok(defs)
}

fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].kind.is_trivia())
}

fn next_identifier<'a>(tokens: &[Token], src: &'a str, from: usize) -> Option<(usize, &'a str)> {
    let idx = next_significant(tokens, from)?;
    if tokens[idx].kind == TokenKind::Identifier {
        Some((idx, tokens[idx].text(src)))
    } else {
        None
    }
}

/// The index of the `}` matching the `{` at `open_idx`.
fn matching_brace(tokens: &[Token], open_idx: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open_idx) {
        match token.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Collects enum member identifiers, skipping initializer expressions.
fn parse_enum_body(body: &[Token], src: &str) -> Vec<String> {
    let mut members = Vec::new();
    let mut idx = 0;
    while idx < body.len() {
        let Some(start) = next_significant(body, idx) else {
            break;
        };
        if body[start].kind == TokenKind::Identifier {
            members.push(body[start].text(src).to_string());
        }
        // Skip to the comma ending this enumerator, past any `= expr`.
        let mut depth = 0usize;
        let mut cursor = start;
        while cursor < body.len() {
            match body[cursor].kind {
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Comma if depth == 0 => break,
                _ => {}
            }
            cursor += 1;
        }
        idx = cursor + 1;
    }
    members
}

/// Parses the declarations inside a struct body into logical fields.
fn parse_struct_body(body: &[Token], src: &str) -> Result<StructFields, ParseError> {
    let mut fields = StructFields::new();

    // Split into declarations on semicolons at depth zero; nested brace
    // groups (anonymous struct/union members) are skipped wholesale.
    let mut decl: Vec<&Token> = Vec::new();
    let mut depth = 0usize;
    for token in body {
        match token.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => {
                if let Some(field) = parse_field_decl(&decl, src) {
                    fields.push(field)?;
                }
                decl.clear();
                continue;
            }
            _ => {}
        }
        if depth == 0 && !token.kind.is_trivia() {
            decl.push(token);
        }
    }

    resolve_array_companions(&mut fields);
    Ok(fields)
}

/// Parses one field declaration into a [`StructField`].
fn parse_field_decl(decl: &[&Token], src: &str) -> Option<StructField> {
    if decl.is_empty() {
        return None;
    }

    // Peel a trailing bit-field width.
    let mut end = decl.len();
    let mut bit_width = None;
    if let Some(colon_idx) = decl.iter().position(|t| t.kind == TokenKind::Colon) {
        if let Some(width_token) = decl.get(colon_idx + 1)
            && width_token.kind == TokenKind::Number
        {
            bit_width = width_token.text(src).parse::<u32>().ok();
        }
        end = colon_idx;
    }

    // Peel a trailing array suffix.
    let mut flexible_array = false;
    let mut fixed_len: Option<u64> = None;
    if let Some(open_idx) = decl[..end].iter().position(|t| t.kind == TokenKind::LBracket) {
        let inner = &decl[open_idx + 1..end];
        match inner.first() {
            Some(token) if token.kind == TokenKind::Number => {
                fixed_len = token.text(src).parse::<u64>().ok();
            }
            _ => flexible_array = true,
        }
        end = open_idx;
    }

    // The field name is the last identifier; stars before it are pointers.
    let name_idx = decl[..end]
        .iter()
        .rposition(|t| t.kind == TokenKind::Identifier)?;
    let name = decl[name_idx].text(src);
    let type_tokens = &decl[..name_idx];
    let stars = type_tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Star)
        .count();

    let mut is_struct_ref = false;
    let mut is_enum_ref = false;
    let mut ref_name: Option<&str> = None;
    let mut saw_char = false;
    let mut saw_float = false;
    let mut saw_bool = false;
    let mut saw_integer = false;
    for token in type_tokens {
        match token.kind {
            TokenKind::Keyword(Keyword::Struct) | TokenKind::Keyword(Keyword::Union) => {
                is_struct_ref = true;
            }
            TokenKind::Keyword(Keyword::Enum) => is_enum_ref = true,
            TokenKind::Keyword(Keyword::Char) => saw_char = true,
            TokenKind::Keyword(Keyword::Float) | TokenKind::Keyword(Keyword::Double) => {
                saw_float = true;
            }
            TokenKind::Keyword(Keyword::UBool) => saw_bool = true,
            TokenKind::Keyword(_) => {
                if INTEGER_TYPES.contains(&token.text(src)) {
                    saw_integer = true;
                }
            }
            TokenKind::Identifier => {
                let text = token.text(src);
                if is_struct_ref || is_enum_ref {
                    ref_name.get_or_insert(text);
                } else if INTEGER_TYPES.contains(&text) || text.ends_with("_t") {
                    saw_integer = true;
                } else {
                    ref_name.get_or_insert(text);
                }
            }
            _ => {}
        }
    }

    let mut field = if is_enum_ref || is_struct_ref {
        let Some(target) = ref_name else {
            debug!(name, "anonymous aggregate member; skipping");
            return None;
        };
        if is_enum_ref {
            StructField::new(name, FieldKind::Enum).ref_name(target)
        } else if stars >= 2 {
            StructField::new(name, FieldKind::Array).ref_name(target)
        } else {
            StructField::new(name, FieldKind::Object).ref_name(target)
        }
    } else if saw_char && stars >= 2 {
        StructField::new(name, FieldKind::Array).ref_name("string")
    } else if saw_char && stars == 1 {
        StructField::new(name, FieldKind::String)
    } else if saw_bool {
        StructField::new(name, FieldKind::Boolean)
    } else if saw_float {
        if stars >= 1 {
            StructField::new(name, FieldKind::Array).ref_name("number")
        } else {
            StructField::new(name, FieldKind::Number)
        }
    } else if saw_integer || saw_char {
        if stars >= 1 {
            StructField::new(name, FieldKind::Array).ref_name("integer")
        } else {
            StructField::new(name, FieldKind::Integer)
        }
    } else if let Some(other) = ref_name {
        StructField::new(name, FieldKind::Object).ref_name(other)
    } else {
        debug!(name, "unrecognized field type; skipping");
        return None;
    };

    field.bit_width = bit_width;
    field.flexible_array = flexible_array;
    if fixed_len.is_some() && field.kind != FieldKind::Array {
        // A fixed-size array of a scalar element type.
        let item = field.kind.as_str().to_string();
        field.kind = FieldKind::Array;
        field.ref_name = Some(item);
    }
    if let Some(len) = fixed_len {
        field.constraints.max_items = Some(len);
    }
    Some(field)
}

/// Pairs `T *xs` with `size_t n_xs` into one logical array field, dropping
/// the companion counter.
fn resolve_array_companions(fields: &mut StructFields) {
    let array_names: Vec<String> = fields
        .fields
        .iter()
        .filter(|f| f.kind == FieldKind::Array)
        .map(|f| f.name.clone())
        .collect();
    fields.fields.retain(|f| {
        !(f.kind == FieldKind::Integer
            && f.name
                .strip_prefix("n_")
                .is_some_and(|base| array_names.iter().any(|n| n == base)))
    });
}
