//! Single-pass tokenizer for C source.
//!
//! Classifies every byte of the input into a token; malformed bytes become
//! [`TokenKind::Unknown`] spans of length one, so the stream always covers
//! the full input with no gaps.

use crate::token::{Keyword, Token, TokenKind, TokenList};

/// Tokenizes a complete source buffer.
pub fn tokenize(src: &str) -> TokenList<'_> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let kind = match bytes[pos] {
            b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => {
                while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c)
                {
                    pos += 1;
                }
                TokenKind::Whitespace
            }
            b'/' if peek(bytes, pos + 1) == Some(b'*') => {
                pos += 2;
                while pos < bytes.len() {
                    if bytes[pos] == b'*' && peek(bytes, pos + 1) == Some(b'/') {
                        pos += 2;
                        break;
                    }
                    pos += 1;
                }
                TokenKind::BlockComment
            }
            b'/' if peek(bytes, pos + 1) == Some(b'/') => {
                pos += 2;
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
                TokenKind::LineComment
            }
            b'"' => {
                pos = scan_quoted(bytes, pos, b'"');
                TokenKind::String
            }
            b'\'' => {
                pos = scan_quoted(bytes, pos, b'\'');
                TokenKind::Char
            }
            b if b.is_ascii_digit() => {
                pos = scan_number(bytes, pos);
                TokenKind::Number
            }
            b'.' if peek(bytes, pos + 1).is_some_and(|b| b.is_ascii_digit()) => {
                pos = scan_number(bytes, pos);
                TokenKind::Number
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                match Keyword::lookup(&src[start..pos]) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Identifier,
                }
            }
            _ => {
                let (kind, width) = scan_punctuator(bytes, pos);
                pos += width;
                kind
            }
        };
        tokens.push(Token {
            kind,
            start,
            len: pos - start,
        });
    }

    TokenList::new(src, tokens)
}

fn peek(bytes: &[u8], pos: usize) -> Option<u8> {
    bytes.get(pos).copied()
}

/// Scans a string or character literal, honoring backslash escapes. An
/// unterminated literal runs to the end of the line (or input).
fn scan_quoted(bytes: &[u8], mut pos: usize, quote: u8) -> usize {
    pos += 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() => pos += 2,
            b if b == quote => return pos + 1,
            b'\n' => return pos,
            _ => pos += 1,
        }
    }
    pos
}

/// Scans a preprocessing number: digits, letters, dots, and exponent signs
/// after `e`/`E`/`p`/`P`. Covers every integer and float form including hex
/// floats and suffixes; validity is the literal decoder's concern.
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    pos += 1;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_alphanumeric() || b == b'.' {
            pos += 1;
        } else if (b == b'+' || b == b'-')
            && matches!(bytes[pos - 1], b'e' | b'E' | b'p' | b'P')
        {
            pos += 1;
        } else {
            break;
        }
    }
    pos
}

/// Longest-match punctuator scan. Returns the kind and its byte width;
/// unmatched bytes come back as a one-byte [`TokenKind::Unknown`].
fn scan_punctuator(bytes: &[u8], pos: usize) -> (TokenKind, usize) {
    let b0 = bytes[pos];
    let b1 = peek(bytes, pos + 1);
    let b2 = peek(bytes, pos + 2);

    // Three-byte forms first.
    match (b0, b1, b2) {
        (b'.', Some(b'.'), Some(b'.')) => return (TokenKind::Ellipsis, 3),
        (b'<', Some(b'<'), Some(b'=')) => return (TokenKind::ShlAssign, 3),
        (b'>', Some(b'>'), Some(b'=')) => return (TokenKind::ShrAssign, 3),
        _ => {}
    }

    match (b0, b1) {
        (b'-', Some(b'>')) => return (TokenKind::Arrow, 2),
        (b'+', Some(b'+')) => return (TokenKind::PlusPlus, 2),
        (b'-', Some(b'-')) => return (TokenKind::MinusMinus, 2),
        (b'<', Some(b'<')) => return (TokenKind::Shl, 2),
        (b'>', Some(b'>')) => return (TokenKind::Shr, 2),
        (b'<', Some(b'=')) => return (TokenKind::Le, 2),
        (b'>', Some(b'=')) => return (TokenKind::Ge, 2),
        (b'=', Some(b'=')) => return (TokenKind::EqEq, 2),
        (b'!', Some(b'=')) => return (TokenKind::BangEq, 2),
        (b'&', Some(b'&')) => return (TokenKind::AmpAmp, 2),
        (b'|', Some(b'|')) => return (TokenKind::PipePipe, 2),
        (b'+', Some(b'=')) => return (TokenKind::PlusAssign, 2),
        (b'-', Some(b'=')) => return (TokenKind::MinusAssign, 2),
        (b'*', Some(b'=')) => return (TokenKind::StarAssign, 2),
        (b'/', Some(b'=')) => return (TokenKind::SlashAssign, 2),
        (b'%', Some(b'=')) => return (TokenKind::PercentAssign, 2),
        (b'&', Some(b'=')) => return (TokenKind::AmpAssign, 2),
        (b'|', Some(b'=')) => return (TokenKind::PipeAssign, 2),
        (b'^', Some(b'=')) => return (TokenKind::CaretAssign, 2),
        (b'#', Some(b'#')) => return (TokenKind::HashHash, 2),
        (b':', Some(b':')) => return (TokenKind::ColonColon, 2),
        _ => {}
    }

    let kind = match b0 {
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b';' => TokenKind::Semicolon,
        b',' => TokenKind::Comma,
        b'.' => TokenKind::Dot,
        b':' => TokenKind::Colon,
        b'?' => TokenKind::Question,
        b'+' => TokenKind::Plus,
        b'-' => TokenKind::Minus,
        b'*' => TokenKind::Star,
        b'/' => TokenKind::Slash,
        b'%' => TokenKind::Percent,
        b'&' => TokenKind::Amp,
        b'|' => TokenKind::Pipe,
        b'^' => TokenKind::Caret,
        b'~' => TokenKind::Tilde,
        b'!' => TokenKind::Bang,
        b'<' => TokenKind::Lt,
        b'>' => TokenKind::Gt,
        b'=' => TokenKind::Assign,
        b'#' => TokenKind::Hash,
        _ => TokenKind::Unknown,
    };
    (kind, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenize_covers_input_with_no_gaps() {
        //* Given
        let src = "int main(void) { return 0; } /* done */ // eol\n@";

        //* When
        let list = tokenize(src);

        //* Then
        let mut expected_start = 0;
        for token in list.tokens() {
            assert_eq!(token.start, expected_start, "tokens must be contiguous");
            expected_start = token.end();
        }
        assert_eq!(expected_start, src.len(), "stream must cover the input");
    }

    #[test]
    fn tokenize_classifies_keywords_and_identifiers() {
        //* Given
        let src = "static _Thread_local int counter;";

        //* When
        let list = tokenize(src);
        let significant: Vec<_> = list
            .tokens()
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| (t.kind, list.text(t)))
            .collect();

        //* Then
        assert_eq!(
            significant,
            vec![
                (TokenKind::Keyword(Keyword::Static), "static"),
                (TokenKind::Keyword(Keyword::UThreadLocal), "_Thread_local"),
                (TokenKind::Keyword(Keyword::Int), "int"),
                (TokenKind::Identifier, "counter"),
                (TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn tokenize_matches_longest_punctuators() {
        //* Given
        let src = "a <<= b >> c ... :: ##";

        //* When
        let found = kinds(src);

        //* Then
        assert!(found.contains(&TokenKind::ShlAssign), "<<= as one token");
        assert!(found.contains(&TokenKind::Shr), ">> as one token");
        assert!(found.contains(&TokenKind::Ellipsis), "... as one token");
        assert!(found.contains(&TokenKind::ColonColon), ":: as one token");
        assert!(found.contains(&TokenKind::HashHash), "## as one token");
    }

    #[test]
    fn tokenize_keeps_comments_as_first_class_tokens() {
        //* Given
        let src = "/** @route GET /pets */ int f(void);";

        //* When
        let list = tokenize(src);

        //* Then
        let comment = &list.tokens()[0];
        assert_eq!(comment.kind, TokenKind::BlockComment);
        assert_eq!(list.text(comment), "/** @route GET /pets */");
    }

    #[test]
    fn tokenize_scans_numeric_literal_forms() {
        //* Given
        let src = "0x1.8p+4 0b1011UL 1e-5 077 .5f";

        //* When
        let list = tokenize(src);
        let numbers: Vec<_> = list
            .tokens()
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| list.text(t))
            .collect();

        //* Then
        assert_eq!(numbers, vec!["0x1.8p+4", "0b1011UL", "1e-5", "077", ".5f"]);
    }

    #[test]
    fn tokenize_turns_stray_bytes_into_unknown_spans() {
        //* Given
        let src = "a @ b";

        //* When
        let found = kinds(src);

        //* Then
        assert_eq!(
            found,
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Unknown,
                TokenKind::Whitespace,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn tokenize_counts_newlines_in_whitespace() {
        //* Given
        let src = "a\n\n  b";

        //* When
        let list = tokenize(src);
        let ws = list.tokens()[1];

        //* Then
        assert_eq!(ws.kind, TokenKind::Whitespace);
        assert_eq!(list.newline_count(&ws), 2, "both newlines in one span");
    }
}
