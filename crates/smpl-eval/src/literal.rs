//! Conversion of literal source text into values.

use crate::error::SemanticError;
use crate::value::Value;

/// Parse an integer literal.
///
/// `0x` selects radix 16 and `0o` selects radix 7; anything else is decimal.
/// Values that do not fit in 64 bits wrap around.
pub fn parse_int(raw: &str) -> Result<Value, SemanticError> {
    let (digits, radix) = if let Some(rest) = raw.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = raw.strip_prefix("0o") {
        (rest, 7)
    } else {
        (raw, 10)
    };

    let invalid = || SemanticError::InvalidLiteral {
        kind: "int",
        raw: raw.to_string(),
    };
    if digits.is_empty() {
        return Err(invalid());
    }

    let mut acc: i64 = 0;
    for ch in digits.chars() {
        let digit = ch.to_digit(radix).ok_or_else(invalid)?;
        acc = acc
            .wrapping_mul(i64::from(radix))
            .wrapping_add(i64::from(digit));
    }
    Ok(Value::Int(acc))
}

pub fn parse_float(raw: &str) -> Result<Value, SemanticError> {
    raw.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| SemanticError::InvalidLiteral {
            kind: "float",
            raw: raw.to_string(),
        })
}

/// Parse a string literal, quotes included, resolving its escapes.
pub fn parse_str(raw: &str) -> Result<Value, SemanticError> {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);

    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        // A trailing lone backslash is dropped.
        let Some(escaped) = chars.next() else { break };
        text.push(match escaped {
            '\\' => '\\',
            '"' => '"',
            'r' => '\r',
            'n' => '\n',
            't' => '\t',
            'b' => '\u{8}',
            other => return Err(SemanticError::UndefinedEscape(other)),
        });
    }
    Ok(Value::str(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_and_hex() {
        assert_eq!(parse_int("0"), Ok(Value::Int(0)));
        assert_eq!(parse_int("42"), Ok(Value::Int(42)));
        assert_eq!(parse_int("0x1F"), Ok(Value::Int(31)));
        assert_eq!(parse_int("0xff"), Ok(Value::Int(255)));
    }

    #[test]
    fn octal_prefix_uses_radix_seven() {
        assert_eq!(parse_int("0o16"), Ok(Value::Int(13)));
        assert_eq!(parse_int("0o10"), Ok(Value::Int(7)));
        assert!(parse_int("0o7").is_err());
    }

    #[test]
    fn int_overflow_wraps() {
        assert_eq!(parse_int("9223372036854775807"), Ok(Value::Int(i64::MAX)));
        assert_eq!(parse_int("9223372036854775808"), Ok(Value::Int(i64::MIN)));
    }

    #[test]
    fn malformed_int() {
        assert_eq!(
            parse_int("0x").unwrap_err().to_string(),
            "Invalid int literal '0x'"
        );
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("1.5"), Ok(Value::Float(1.5)));
        assert_eq!(parse_float("1.5e10"), Ok(Value::Float(1.5e10)));
        assert_eq!(parse_float("2E-3"), Ok(Value::Float(0.002)));
        assert!(parse_float("1.2.3").is_err());
    }

    #[test]
    fn string_escapes() {
        assert_eq!(parse_str(r#""plain""#), Ok(Value::str("plain")));
        assert_eq!(
            parse_str(r#""a\"b\\c\n\t\r\b""#),
            Ok(Value::str("a\"b\\c\n\t\r\u{8}"))
        );
        assert_eq!(parse_str(r#""""#), Ok(Value::str("")));
    }

    #[test]
    fn undefined_escape() {
        assert_eq!(
            parse_str(r#""bad \q""#).unwrap_err().to_string(),
            "Undefined escape: 'q'"
        );
    }
}
