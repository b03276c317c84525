//! Typed write input and its normalization to canonical text.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Serialize;
use serde_json::Value;
use sysparam_storage::ParamType;

use crate::error::{ParamError, Result};

/// A value handed to the store for writing.
///
/// Text is always taken verbatim; every other variant is rendered to
/// canonical text according to the parameter's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Decimal(BigDecimal),
    Bool(bool),
    Json(Value),
}

impl ParamValue {
    /// Serializes any value into a JSON input.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ParamError::invalid_argument(format!("invalid json value: {e}")))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{}", d.to_plain_string()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        Self::Decimal(BigDecimal::from(n))
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<BigDecimal> for ParamValue {
    fn from(d: BigDecimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<Value> for ParamValue {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Renders a write input as canonical text for the declared type.
///
/// Returns `None` only for [`ParamValue::Null`].
pub fn normalize(value: ParamValue, param_type: ParamType) -> Result<Option<String>> {
    let text = match (value, param_type) {
        (ParamValue::Null, _) => return Ok(None),
        (ParamValue::Text(s), _) => s,
        (v, ParamType::Text) => v.to_string(),

        (ParamValue::Integer(n), ParamType::Number) => plain_decimal(BigDecimal::from(n)),
        (ParamValue::Float(n), ParamType::Number) => plain_decimal(float_to_decimal(n)?),
        (ParamValue::Decimal(d), ParamType::Number) => plain_decimal(d),
        (v, ParamType::Number) => v.to_string(),

        (ParamValue::Bool(b), ParamType::Boolean) => b.to_string(),
        (ParamValue::Integer(n), ParamType::Boolean) => boolean_from_number(n == 1, n == 0)?,
        (ParamValue::Float(n), ParamType::Boolean) => boolean_from_number(n == 1.0, n == 0.0)?,
        (ParamValue::Decimal(d), ParamType::Boolean) => {
            boolean_from_number(d == BigDecimal::from(1), d == BigDecimal::from(0))?
        }
        (v, ParamType::Boolean) => v.to_string(),

        (ParamValue::Float(n), ParamType::Json) => plain_decimal(float_to_decimal(n)?),
        (ParamValue::Decimal(d), ParamType::Json) => d.to_plain_string(),
        (ParamValue::Json(v), ParamType::Json) => serde_json::to_string(&v)
            .map_err(|e| ParamError::invalid_argument(format!("invalid json value: {e}")))?,
        (v, ParamType::Json) => v.to_string(),
    };

    Ok(Some(text))
}

/// Shortest exact plain-decimal text: trailing zeros stripped, no exponent.
fn plain_decimal(d: BigDecimal) -> String {
    d.normalized().to_plain_string()
}

fn float_to_decimal(n: f64) -> Result<BigDecimal> {
    if !n.is_finite() {
        return Err(ParamError::invalid_argument(format!(
            "number must be finite, got {n}"
        )));
    }
    BigDecimal::from_str(&n.to_string())
        .map_err(|e| ParamError::invalid_argument(format!("invalid number {n}: {e}")))
}

fn boolean_from_number(is_one: bool, is_zero: bool) -> Result<String> {
    if is_one {
        Ok("true".to_string())
    } else if is_zero {
        Ok("false".to_string())
    } else {
        Err(ParamError::invalid_argument(
            "boolean expects true/false or 1/0",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(value: impl Into<ParamValue>, param_type: ParamType) -> Option<String> {
        normalize(value.into(), param_type).unwrap()
    }

    #[test]
    fn test_null_and_text_pass_through() {
        assert_eq!(norm(ParamValue::Null, ParamType::Number), None);
        assert_eq!(norm(None::<i32>, ParamType::Boolean), None);
        for ty in [
            ParamType::Text,
            ParamType::Number,
            ParamType::Boolean,
            ParamType::Json,
        ] {
            assert_eq!(norm(" 5.0 ", ty).as_deref(), Some(" 5.0 "));
        }
    }

    #[test]
    fn test_number_normalization() {
        assert_eq!(norm(42, ParamType::Number).as_deref(), Some("42"));
        assert_eq!(norm(42.0, ParamType::Number).as_deref(), Some("42"));
        assert_eq!(norm(1.50, ParamType::Number).as_deref(), Some("1.5"));
        assert_eq!(norm(-0.25, ParamType::Number).as_deref(), Some("-0.25"));
        assert_eq!(norm(1e20, ParamType::Number).as_deref(), Some("100000000000000000000"));
        assert_eq!(
            norm(BigDecimal::from_str("12.3400").unwrap(), ParamType::Number).as_deref(),
            Some("12.34")
        );
        assert_eq!(norm(100u64, ParamType::Number).as_deref(), Some("100"));
    }

    #[test]
    fn test_number_rejects_non_finite() {
        let err = normalize(f64::NAN.into(), ParamType::Number).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(normalize(f64::INFINITY.into(), ParamType::Json).is_err());
    }

    #[test]
    fn test_number_non_numeric_renders_default_form() {
        assert_eq!(norm(true, ParamType::Number).as_deref(), Some("true"));
    }

    #[test]
    fn test_boolean_normalization() {
        assert_eq!(norm(true, ParamType::Boolean).as_deref(), Some("true"));
        assert_eq!(norm(false, ParamType::Boolean).as_deref(), Some("false"));
        assert_eq!(norm(1, ParamType::Boolean).as_deref(), Some("true"));
        assert_eq!(norm(0, ParamType::Boolean).as_deref(), Some("false"));
        assert_eq!(norm(1.0, ParamType::Boolean).as_deref(), Some("true"));
        assert_eq!(
            norm(BigDecimal::from(0), ParamType::Boolean).as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_boolean_rejects_other_numbers() {
        for value in [ParamValue::from(2), ParamValue::from(-1), ParamValue::from(0.5)] {
            let err = normalize(value, ParamType::Boolean).unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn test_json_normalization() {
        assert_eq!(
            norm(json!({"a": 1, "b": [true]}), ParamType::Json).as_deref(),
            Some(r#"{"a":1,"b":[true]}"#)
        );
        assert_eq!(norm(5, ParamType::Json).as_deref(), Some("5"));
        assert_eq!(norm(false, ParamType::Json).as_deref(), Some("false"));
        // Strings are never re-encoded
        assert_eq!(norm("[1,2]", ParamType::Json).as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_json_from_serializable() {
        #[derive(Serialize)]
        struct Limits {
            max: u32,
        }

        let value = ParamValue::json(&Limits { max: 3 }).unwrap();
        assert_eq!(norm(value, ParamType::Json).as_deref(), Some(r#"{"max":3}"#));
    }

    #[test]
    fn test_text_default_forms() {
        assert_eq!(norm(42, ParamType::Text).as_deref(), Some("42"));
        assert_eq!(norm(true, ParamType::Text).as_deref(), Some("true"));
        assert_eq!(norm(json!([1]), ParamType::Text).as_deref(), Some("[1]"));
    }
}
