//! Client-side parameter substitution
//!
//! Used when the server cannot prepare a statement because it contains
//! `%` placeholders. Values are rendered as SQL literals and substituted
//! into the text, which is then executed directly.

use crate::batch::Params;
use crate::error::{Error, Result};
use crate::row::Value;

/// Render a value as an SQL literal
///
/// NaN and infinite doubles have no literal form and are rejected.
pub fn escape_value(value: &Value) -> Result<String> {
    let literal = match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(true) => "TRUE".to_string(),
        Value::Boolean(false) => "FALSE".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Double(d) if !d.is_finite() => {
            return Err(Error::usage(format!(
                "cannot render non-finite number {} as an SQL literal",
                d
            )))
        }
        Value::Double(d) => d.to_string(),
        Value::Decimal(d) => d.clone(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Bytes(b) => format!("X'{}'", hex::encode_upper(b)),
        Value::Date(_) | Value::Time(_) | Value::Timestamp(_) => format!("'{}'", value),
    };
    Ok(literal)
}

/// Substitute `%s` and `%(name)s` placeholders in `operation`.
///
/// `%%` produces a literal `%`. Positional placeholders take the values of
/// a sequence (or a single bare value) in order; named placeholders look up
/// a map.
pub fn format_operation(operation: &str, params: &Params) -> Result<String> {
    let positional: &[Value] = match params {
        Params::Positional(values) => values,
        Params::Scalar(value) => std::slice::from_ref(value),
        Params::Keyed(_) => &[],
    };
    let mut next_positional = 0usize;

    let mut output = String::with_capacity(operation.len());
    let mut chars = operation.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => output.push('%'),
            Some('s') => {
                if matches!(params, Params::Keyed(_)) {
                    return Err(Error::usage("format requires a mapping for %(name)s placeholders"));
                }
                let value = positional.get(next_positional).ok_or_else(|| {
                    Error::usage("not enough arguments for format string")
                })?;
                next_positional += 1;
                output.push_str(&escape_value(value)?);
            }
            Some('(') => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some(')') => break,
                        Some(ch) => key.push(ch),
                        None => return Err(Error::usage("incomplete format key")),
                    }
                }
                if chars.next() != Some('s') {
                    return Err(Error::usage(format!(
                        "unsupported format for key '{}', only %(name)s is allowed",
                        key
                    )));
                }
                let Params::Keyed(values) = params else {
                    return Err(Error::usage("format requires a mapping"));
                };
                let value = values
                    .get(&key)
                    .ok_or_else(|| Error::usage(format!("missing format key '{}'", key)))?;
                output.push_str(&escape_value(value)?);
            }
            Some(other) => {
                return Err(Error::usage(format!(
                    "unsupported format character '{}'",
                    other
                )))
            }
            None => return Err(Error::usage("incomplete format")),
        }
    }

    if next_positional < positional.len() {
        return Err(Error::usage(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use indexmap::IndexMap;

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value(&Value::Null).unwrap(), "NULL");
        assert_eq!(escape_value(&Value::Boolean(true)).unwrap(), "TRUE");
        assert_eq!(escape_value(&Value::Integer(-3)).unwrap(), "-3");
        assert_eq!(escape_value(&Value::Double(1.5)).unwrap(), "1.5");
        assert_eq!(escape_value(&Value::from("it's")).unwrap(), "'it''s'");
        assert_eq!(
            escape_value(&Value::Bytes(vec![0xab, 0x01])).unwrap(),
            "X'AB01'"
        );
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(escape_value(&Value::Date(date)).unwrap(), "'2024-01-31'");
    }

    #[test]
    fn test_non_finite_doubles_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(escape_value(&Value::Double(value)).unwrap_err().is_usage_error());
        }
        let err = format_operation("VALUES (%s)", &Params::from(Value::Double(f64::NAN))).unwrap_err();
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_positional_substitution() {
        let sql = format_operation(
            "INSERT INTO T VALUES (%s, %s)",
            &Params::from(vec![Value::Integer(1), Value::from("a")]),
        )
        .unwrap();
        assert_eq!(sql, "INSERT INTO T VALUES (1, 'a')");
    }

    #[test]
    fn test_named_substitution() {
        let mut values = IndexMap::new();
        values.insert("name".to_string(), Value::from("x"));
        let sql = format_operation(
            "SELECT * FROM T WHERE N = %(name)s AND P LIKE 'a%%'",
            &Params::Keyed(values),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM T WHERE N = 'x' AND P LIKE 'a%'");
    }

    #[test]
    fn test_scalar_fills_single_placeholder() {
        let sql = format_operation("VALUES (%s)", &Params::from(Value::Integer(7))).unwrap();
        assert_eq!(sql, "VALUES (7)");
    }

    #[test]
    fn test_argument_count_mismatch() {
        let err = format_operation("(%s, %s)", &Params::from(vec![Value::Integer(1)])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "programming error: not enough arguments for format string"
        );
        let err = format_operation(
            "(%s)",
            &Params::from(vec![Value::Integer(1), Value::Integer(2)]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not all arguments converted"));
    }

    #[test]
    fn test_missing_key_and_bad_format() {
        let err = format_operation("%(a)s", &Params::Keyed(IndexMap::new())).unwrap_err();
        assert!(err.is_usage_error());
        assert!(format_operation("%d", &Params::none()).is_err());
        assert!(format_operation("50%", &Params::none()).is_err());
    }
}
