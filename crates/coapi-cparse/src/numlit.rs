//! Numeric literal decoder.
//!
//! Classifies a C literal as integer or floating by prefix and shape, decodes
//! its value, and records base and suffix flags. Integer overflow saturates
//! to `u64::MAX` and sets the overflow flag rather than failing.

use crate::error::ParseError;

/// A decoded numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericLiteral {
    /// An integer literal.
    Int(IntLiteral),
    /// A floating literal.
    Float(FloatLiteral),
}

/// A decoded integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntLiteral {
    /// The decoded value, saturated on overflow.
    pub value: u64,
    /// The numeral base: 2, 8, 10 or 16.
    pub base: u32,
    /// The `u`/`U` suffix.
    pub unsigned: bool,
    /// The `l`/`L` suffix.
    pub long: bool,
    /// The `ll`/`LL` suffix.
    pub long_long: bool,
    /// Set when the accumulator saturated.
    pub overflow: bool,
}

/// A decoded floating literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatLiteral {
    /// The decoded value.
    pub value: f64,
    /// The `f`/`F` suffix.
    pub is_float: bool,
    /// The `l`/`L` suffix.
    pub is_long_double: bool,
    /// The C23 decimal-float suffix, when present.
    pub decimal: Option<DecimalKind>,
}

/// The C23 decimal floating precisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalKind {
    /// `df`: `_Decimal32`.
    D32,
    /// `dd`: `_Decimal64`.
    D64,
    /// `dl`: `_Decimal128`.
    D128,
}

/// Decodes one numeric literal.
pub fn decode(text: &str) -> Result<NumericLiteral, ParseError> {
    if text.is_empty() {
        return Err(ParseError::Numeric("empty literal".into()));
    }

    let lower = text.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");
    let is_binary = lower.starts_with("0b");
    let body = &lower[if is_hex || is_binary { 2 } else { 0 }..];

    let is_float = if is_binary {
        false
    } else if is_hex {
        body.contains('p')
    } else {
        body.contains('.') || body.contains('e') || body.contains('p')
    };

    if is_float {
        decode_float(&lower, is_hex).map(NumericLiteral::Float)
    } else {
        decode_int(&lower, text).map(NumericLiteral::Int)
    }
}

fn decode_int(lower: &str, original: &str) -> Result<IntLiteral, ParseError> {
    let (base, digits_start) = if lower.starts_with("0x") {
        (16, 2)
    } else if lower.starts_with("0b") {
        (2, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, 1)
    } else {
        (10, 0)
    };

    let body = &lower[digits_start..];
    let digits_end = body
        .find(|c: char| c.to_digit(base).is_none() && c != '\'')
        .unwrap_or(body.len());
    let (digits, suffix) = body.split_at(digits_end);
    if digits.is_empty() {
        return Err(ParseError::Numeric(format!(
            "literal {original:?} has no digits"
        )));
    }

    let mut value: u64 = 0;
    let mut overflow = false;
    for c in digits.chars() {
        if c == '\'' {
            continue;
        }
        let digit = c
            .to_digit(base)
            .ok_or_else(|| ParseError::Numeric(format!("bad digit in {original:?}")))?;
        value = match value
            .checked_mul(u64::from(base))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(v) => v,
            None => {
                overflow = true;
                u64::MAX
            }
        };
        if overflow {
            break;
        }
    }

    let mut literal = IntLiteral {
        value,
        base,
        overflow,
        ..Default::default()
    };
    parse_int_suffix(suffix, original, &mut literal)?;
    Ok(literal)
}

/// Applies C99's integer-suffix grammar: at most one `u` and one `l`/`ll`
/// run, in either order.
fn parse_int_suffix(suffix: &str, original: &str, out: &mut IntLiteral) -> Result<(), ParseError> {
    let mut rest = suffix;
    while !rest.is_empty() {
        if rest.starts_with('u') {
            if out.unsigned {
                return Err(ParseError::Numeric(format!(
                    "duplicate unsigned suffix in {original:?}"
                )));
            }
            out.unsigned = true;
            rest = &rest[1..];
        } else if rest.starts_with("ll") {
            if out.long || out.long_long {
                return Err(ParseError::Numeric(format!(
                    "duplicate width suffix in {original:?}"
                )));
            }
            out.long_long = true;
            rest = &rest[2..];
        } else if rest.starts_with('l') {
            if out.long || out.long_long {
                return Err(ParseError::Numeric(format!(
                    "duplicate width suffix in {original:?}"
                )));
            }
            out.long = true;
            rest = &rest[1..];
        } else {
            return Err(ParseError::Numeric(format!(
                "unrecognized suffix {rest:?} in {original:?}"
            )));
        }
    }
    Ok(())
}

fn decode_float(lower: &str, is_hex: bool) -> Result<FloatLiteral, ParseError> {
    let mut out = FloatLiteral {
        value: 0.0,
        is_float: false,
        is_long_double: false,
        decimal: None,
    };

    // Strip suffixes from the tail: decimal-float forms first, then the
    // classic single-letter widths.
    let mut body = lower;
    if let Some(stripped) = body.strip_suffix("df") {
        out.decimal = Some(DecimalKind::D32);
        body = stripped;
    } else if let Some(stripped) = body.strip_suffix("dd") {
        out.decimal = Some(DecimalKind::D64);
        body = stripped;
    } else if let Some(stripped) = body.strip_suffix("dl") {
        out.decimal = Some(DecimalKind::D128);
        body = stripped;
    } else if let Some(stripped) = body.strip_suffix('f') {
        out.is_float = true;
        body = stripped;
    } else if let Some(stripped) = body.strip_suffix('l') {
        out.is_long_double = true;
        body = stripped;
    }

    out.value = if is_hex {
        parse_hex_float(body)?
    } else {
        body.parse::<f64>()
            .map_err(|_| ParseError::Numeric(format!("malformed float {body:?}")))?
    };
    Ok(out)
}

/// Parses `0x h.hhh p±e` into an `f64`.
fn parse_hex_float(body: &str) -> Result<f64, ParseError> {
    let digits = body
        .strip_prefix("0x")
        .ok_or_else(|| ParseError::Numeric(format!("malformed hex float {body:?}")))?;
    let (mantissa_text, exponent_text) = match digits.split_once('p') {
        Some((m, e)) => (m, e),
        None => (digits, "0"),
    };
    let exponent: i32 = exponent_text
        .parse()
        .map_err(|_| ParseError::Numeric(format!("malformed hex exponent {exponent_text:?}")))?;

    let (int_part, frac_part) = match mantissa_text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa_text, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ParseError::Numeric(format!(
            "hex float {body:?} has no mantissa digits"
        )));
    }

    let mut mantissa = 0.0f64;
    for c in int_part.chars() {
        let digit = c
            .to_digit(16)
            .ok_or_else(|| ParseError::Numeric(format!("bad hex digit in {body:?}")))?;
        mantissa = mantissa * 16.0 + f64::from(digit);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        let digit = c
            .to_digit(16)
            .ok_or_else(|| ParseError::Numeric(format!("bad hex digit in {body:?}")))?;
        mantissa += f64::from(digit) * scale;
        scale /= 16.0;
    }
    Ok(mantissa * 2.0f64.powi(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_int_literal(text: &str) -> IntLiteral {
        match decode(text).expect("literal should decode") {
            NumericLiteral::Int(int) => int,
            NumericLiteral::Float(float) => panic!("expected integer, got {float:?}"),
        }
    }

    fn decode_float_literal(text: &str) -> FloatLiteral {
        match decode(text).expect("literal should decode") {
            NumericLiteral::Float(float) => float,
            NumericLiteral::Int(int) => panic!("expected float, got {int:?}"),
        }
    }

    #[test]
    fn decode_binary_with_ul_suffix_sets_value_base_and_flags() {
        //* Given / When
        let int = decode_int_literal("0b1011UL");

        //* Then
        assert_eq!(int.value, 11);
        assert_eq!(int.base, 2);
        assert!(int.unsigned, "U suffix sets unsigned");
        assert!(int.long, "L suffix sets long");
        assert!(!int.long_long, "no LL suffix");
        assert!(!int.overflow, "no overflow");
    }

    #[test]
    fn decode_recognizes_all_integer_bases() {
        //* Given / When / Then
        assert_eq!(decode_int_literal("0x1F").value, 31);
        assert_eq!(decode_int_literal("0x1F").base, 16);
        assert_eq!(decode_int_literal("077").value, 63);
        assert_eq!(decode_int_literal("077").base, 8);
        assert_eq!(decode_int_literal("42").value, 42);
        assert_eq!(decode_int_literal("42").base, 10);
        assert_eq!(decode_int_literal("0").value, 0);
        assert_eq!(decode_int_literal("0").base, 10);
    }

    #[test]
    fn decode_suffix_order_is_free_and_duplicates_are_rejected() {
        //* Given / When
        let lu = decode_int_literal("1lu");
        let ull = decode_int_literal("2ULL");

        //* Then
        assert!(lu.unsigned && lu.long, "lu accepted in either order");
        assert!(ull.unsigned && ull.long_long, "ULL accepted");
        assert!(decode("1uu").is_err(), "duplicate u rejected");
        assert!(decode("1lul").is_err(), "split width suffix rejected");
        assert!(decode("1q").is_err(), "unknown suffix rejected");
    }

    #[test]
    fn decode_binary_overflow_saturates_and_flags() {
        //* Given
        let text = format!("0b{}", "1".repeat(65));

        //* When
        let int = decode_int_literal(&text);

        //* Then
        assert_eq!(int.value, u64::MAX, "value saturates");
        assert!(int.overflow, "overflow flag set");
    }

    #[test]
    fn decode_classifies_floats_by_shape_and_suffix() {
        //* Given / When
        let plain = decode_float_literal("1.5");
        let exp = decode_float_literal("1e3");
        let single = decode_float_literal("2.5F");
        let long_double = decode_float_literal("2.5L");

        //* Then
        assert_eq!(plain.value, 1.5);
        assert_eq!(exp.value, 1000.0);
        assert!(single.is_float, "F suffix sets float");
        assert!(long_double.is_long_double, "L suffix sets long double");
    }

    #[test]
    fn decode_hex_float_uses_binary_exponent() {
        //* Given / When
        let float = decode_float_literal("0x1.8p+4");

        //* Then
        assert_eq!(float.value, 24.0, "1.5 * 2^4");
    }

    #[test]
    fn decode_hex_with_e_digit_stays_integer() {
        //* Given / When
        let int = decode_int_literal("0x1E");

        //* Then
        assert_eq!(int.value, 30, "E is a hex digit, not an exponent");
    }

    #[test]
    fn decode_c23_decimal_float_suffixes() {
        //* Given / When
        let d32 = decode_float_literal("1.5df");
        let d64 = decode_float_literal("1.5dd");
        let d128 = decode_float_literal("1.5dl");

        //* Then
        assert_eq!(d32.decimal, Some(DecimalKind::D32));
        assert_eq!(d64.decimal, Some(DecimalKind::D64));
        assert_eq!(d128.decimal, Some(DecimalKind::D128));
    }
}
