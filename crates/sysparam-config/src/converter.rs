//! Conversion of canonical parameter text into typed values.
//!
//! The declared [`ParamType`] of a parameter selects which [`FromParam`]
//! method runs; the target type decides what that method accepts. Every
//! failure is a [`TypeMismatch`].
//!
//! | Declared | Accepted targets |
//! |----------|------------------|
//! | TEXT     | `String`, `Duration`, [`ParamEnum`] types |
//! | NUMBER   | `String`, `i32`, `i64`, `u32`, `u64`, `f64`, `BigDecimal` |
//! | BOOLEAN  | `bool` |
//! | JSON     | anything serde can decode: primitives, `Value`, [`ParamMap`], [`Json<T>`] |

use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use bigdecimal::BigDecimal;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sysparam_storage::{ParamType, Parameter};

use crate::error::TypeMismatch;

/// A JSON object with dynamically typed values.
pub type ParamMap = Map<String, Value>;

type Converted<T> = std::result::Result<T, TypeMismatch>;

/// ISO-8601 duration: `PnDTnHnMn.nS`, case-insensitive
static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:[.,](\d{0,9}))?S)?)?$")
        .expect("Invalid ISO duration regex")
});

/// Plain decimal with optional sign and exponent; no digit separators
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Invalid decimal regex")
});

/// Short form: `<integer><unit>` with unit in ms|s|m|h|d
static SHORT_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*(ms|s|m|h|d)\s*$").expect("Invalid short duration regex")
});

/// A type a parameter value can be converted into.
///
/// There is one method per declared type. A target only overrides the arms it
/// accepts; the defaults reject with a mismatch labelled by the declared type.
pub trait FromParam: Sized {
    /// Converts the raw text of a TEXT parameter.
    fn from_text(key: &str, raw: &str) -> Converted<Self> {
        Err(TypeMismatch::new(key, "TEXT", Some(raw)))
    }

    /// Converts the raw text of a NUMBER parameter.
    fn from_number(key: &str, raw: &str) -> Converted<Self> {
        Err(TypeMismatch::new(key, "NUMBER", Some(raw)))
    }

    /// Converts the raw text of a BOOLEAN parameter.
    fn from_boolean(key: &str, raw: &str) -> Converted<Self> {
        Err(TypeMismatch::new(key, "BOOLEAN", Some(raw)))
    }

    /// Decodes the raw text of a JSON parameter.
    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        Err(TypeMismatch::new(key, "JSON", Some(raw)))
    }

    /// Called when the stored value is null. Only optional targets accept it.
    fn from_null(key: &str, declared: ParamType) -> Converted<Self> {
        Err(TypeMismatch::new(key, declared.label(), None))
    }
}

/// A fieldless enum resolvable from its symbolic names.
///
/// Implement it with [`param_enum!`](crate::param_enum), which also wires up
/// [`FromParam`].
pub trait ParamEnum: Sized + Copy + 'static {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// Symbolic name of the variant as stored in parameter text.
    fn name(&self) -> &'static str;
}

/// Implements [`ParamEnum`] and [`FromParam`] for a fieldless `Copy` enum.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum LogLevel { Debug, Info }
///
/// sysparam_config::param_enum!(LogLevel { Debug => "DEBUG", Info => "INFO" });
/// ```
#[macro_export]
macro_rules! param_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $crate::ParamEnum for $ty {
            const VARIANTS: &'static [Self] = &[$($ty::$variant),+];

            fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl $crate::FromParam for $ty {
            fn from_text(
                key: &str,
                raw: &str,
            ) -> ::std::result::Result<Self, $crate::TypeMismatch> {
                $crate::converter::resolve_enum(key, raw)
            }

            fn from_json(
                key: &str,
                raw: &str,
            ) -> ::std::result::Result<Self, $crate::TypeMismatch> {
                $crate::converter::resolve_enum_json(key, raw)
            }
        }
    };
}

/// Target wrapper decoding a JSON parameter into any deserializable type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwraps the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> FromParam for Json<T> {
    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        decode_json(key, raw).map(Json)
    }
}

impl<T: FromParam> FromParam for Option<T> {
    fn from_text(key: &str, raw: &str) -> Converted<Self> {
        T::from_text(key, raw).map(Some)
    }

    fn from_number(key: &str, raw: &str) -> Converted<Self> {
        T::from_number(key, raw).map(Some)
    }

    fn from_boolean(key: &str, raw: &str) -> Converted<Self> {
        T::from_boolean(key, raw).map(Some)
    }

    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        if raw.trim() == "null" {
            return Ok(None);
        }
        T::from_json(key, raw).map(Some)
    }

    fn from_null(_key: &str, _declared: ParamType) -> Converted<Self> {
        Ok(None)
    }
}

impl FromParam for String {
    fn from_text(_key: &str, raw: &str) -> Converted<Self> {
        Ok(raw.to_string())
    }

    fn from_number(_key: &str, raw: &str) -> Converted<Self> {
        Ok(raw.to_string())
    }

    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        decode_json(key, raw)
    }
}

macro_rules! impl_from_param_number {
    ($($ty:ty),*) => {$(
        impl FromParam for $ty {
            fn from_number(key: &str, raw: &str) -> Converted<Self> {
                raw.trim()
                    .parse::<$ty>()
                    .map_err(|_| TypeMismatch::new(key, "NUMBER", Some(raw)))
            }

            fn from_json(key: &str, raw: &str) -> Converted<Self> {
                decode_json(key, raw)
            }
        }
    )*};
}

impl_from_param_number!(i32, i64, u32, u64);

impl FromParam for f64 {
    fn from_number(key: &str, raw: &str) -> Converted<Self> {
        decimal_text(key, raw)?
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| TypeMismatch::new(key, "NUMBER", Some(raw)))
    }

    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        decode_json(key, raw)
    }
}

impl FromParam for BigDecimal {
    fn from_number(key: &str, raw: &str) -> Converted<Self> {
        BigDecimal::from_str(decimal_text(key, raw)?)
            .map_err(|_| TypeMismatch::new(key, "NUMBER", Some(raw)))
    }

    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        match decode_json::<Value>(key, raw)? {
            Value::Number(n) => BigDecimal::from_str(&n.to_string())
                .map_err(|_| TypeMismatch::new(key, "JSON", Some(raw))),
            _ => Err(TypeMismatch::new(key, "JSON", Some(raw))),
        }
    }
}

impl FromParam for bool {
    fn from_boolean(key: &str, raw: &str) -> Converted<Self> {
        let v = raw.trim();
        if v == "1" || v.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if v == "0" || v.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(TypeMismatch::new(key, "BOOLEAN", Some(raw)))
        }
    }

    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        decode_json(key, raw)
    }
}

impl FromParam for Duration {
    fn from_text(key: &str, raw: &str) -> Converted<Self> {
        parse_duration(key, raw)
    }

    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        let text: String = decode_json(key, raw)?;
        parse_duration(key, &text)
    }
}

impl FromParam for Value {
    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        decode_json(key, raw)
    }
}

impl FromParam for ParamMap {
    fn from_json(key: &str, raw: &str) -> Converted<Self> {
        decode_json(key, raw)
    }
}

/// Converts a parameter to `T`, dispatching on its declared type.
pub fn convert<T: FromParam>(param: &Parameter) -> Converted<T> {
    let key = param.key.as_str();
    let declared = param.effective_type();

    match param.value.as_deref() {
        None => T::from_null(key, declared),
        Some(raw) => dispatch(key, raw, declared),
    }
}

/// Resolves a parameter to an enum variant regardless of its declared type.
pub fn convert_enum<E: ParamEnum>(param: &Parameter) -> Converted<E> {
    match param.value.as_deref() {
        None => Err(TypeMismatch::new(&param.key, "ENUM", None)),
        Some(raw) => resolve_enum(&param.key, raw),
    }
}

/// Converts a parameter into a list of `T`.
///
/// JSON parameters are decoded as a JSON array. Anything else is split on
/// commas, trimmed, stripped of empty segments, and each segment converted
/// as if it were a parameter of the same declared type. A blank or null value
/// is an empty list.
pub fn convert_list<T: FromParam>(param: &Parameter) -> Converted<Vec<T>> {
    let Some(raw) = param.value.as_deref().filter(|v| !v.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    let key = param.key.as_str();
    let declared = param.effective_type();

    if declared == ParamType::Json {
        let mismatch = || TypeMismatch::new(key, "JSON[]", Some(raw));
        let items: Vec<Value> = serde_json::from_str(raw).map_err(|_| mismatch())?;
        return items
            .iter()
            .map(|item| T::from_json(key, &item.to_string()).map_err(|_| mismatch()))
            .collect();
    }

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| dispatch(key, item, declared))
        .collect()
}

/// Decodes raw text as a JSON object.
pub fn to_map(key: &str, raw: &str) -> Converted<ParamMap> {
    serde_json::from_str(raw).map_err(|_| TypeMismatch::new(key, "JSON", Some(raw)))
}

/// Decodes raw text as a JSON array of objects.
pub fn to_map_list(key: &str, raw: &str) -> Converted<Vec<ParamMap>> {
    serde_json::from_str(raw).map_err(|_| TypeMismatch::new(key, "JSON[]", Some(raw)))
}

/// Parses a duration.
///
/// Tries ISO-8601 (`PT15M`), then the short form (`200ms`, `5s`, `2m`, `1h`,
/// `7d`), then a bare integer as milliseconds. Blank text is zero. Negative
/// durations are not representable and are rejected.
pub fn parse_duration(key: &str, raw: &str) -> Converted<Duration> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(Duration::ZERO);
    }

    if let Some(d) = parse_iso_duration(s) {
        return Ok(d);
    }

    if let Some(caps) = SHORT_DURATION.captures(s) {
        let unit = caps[2].to_ascii_lowercase();
        let duration = caps[1].parse::<u64>().ok().and_then(|n| match unit.as_str() {
            "ms" => Some(Duration::from_millis(n)),
            "s" => Some(Duration::from_secs(n)),
            "m" => n.checked_mul(60).map(Duration::from_secs),
            "h" => n.checked_mul(3_600).map(Duration::from_secs),
            "d" => n.checked_mul(86_400).map(Duration::from_secs),
            _ => None,
        });
        return duration.ok_or_else(|| TypeMismatch::new(key, "DURATION", Some(raw)));
    }

    s.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| TypeMismatch::new(key, "DURATION", Some(raw)))
}

fn parse_iso_duration(s: &str) -> Option<Duration> {
    let caps = ISO_DURATION.captures(s)?;
    let part = |i: usize| -> Option<Option<u64>> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<u64>().ok().map(Some),
            None => Some(None),
        }
    };

    let days = part(1)?;
    let hours = part(2)?;
    let minutes = part(3)?;
    let seconds = part(4)?;

    // "P" and "PT" alone, or a dangling time designator, are not durations
    let has_time = hours.is_some() || minutes.is_some() || seconds.is_some();
    if !has_time && (days.is_none() || s.contains(['T', 't'])) {
        return None;
    }

    let secs = days
        .unwrap_or(0)
        .checked_mul(86_400)?
        .checked_add(hours.unwrap_or(0).checked_mul(3_600)?)?
        .checked_add(minutes.unwrap_or(0).checked_mul(60)?)?
        .checked_add(seconds.unwrap_or(0))?;

    let nanos = match caps.get(5).map(|m| m.as_str()) {
        Some(frac) if !frac.is_empty() => format!("{frac:0<9}").parse::<u32>().ok()?,
        _ => 0,
    };

    Some(Duration::new(secs, nanos))
}

/// Matches enum names exactly first, then ignoring case.
pub fn resolve_enum<E: ParamEnum>(key: &str, raw: &str) -> Converted<E> {
    let value = raw.trim();
    E::VARIANTS
        .iter()
        .find(|v| v.name() == value)
        .or_else(|| E::VARIANTS.iter().find(|v| eq_ignore_case(v.name(), value)))
        .copied()
        .ok_or_else(|| TypeMismatch::new(key, "ENUM", Some(raw)))
}

/// Decodes a JSON string and resolves it as an enum name.
pub fn resolve_enum_json<E: ParamEnum>(key: &str, raw: &str) -> Converted<E> {
    let name: String = decode_json(key, raw)?;
    resolve_enum(key, &name)
}

fn dispatch<T: FromParam>(key: &str, raw: &str, declared: ParamType) -> Converted<T> {
    match declared {
        ParamType::Text => T::from_text(key, raw),
        ParamType::Number => T::from_number(key, raw),
        ParamType::Boolean => T::from_boolean(key, raw),
        ParamType::Json => T::from_json(key, raw),
    }
}

/// Trimmed text if it is a plain decimal literal.
fn decimal_text<'a>(key: &str, raw: &'a str) -> Converted<&'a str> {
    let value = raw.trim();
    if DECIMAL.is_match(value) {
        Ok(value)
    } else {
        Err(TypeMismatch::new(key, "NUMBER", Some(raw)))
    }
}

fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Converted<T> {
    serde_json::from_str(raw).map_err(|_| TypeMismatch::new(key, "JSON", Some(raw)))
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Color {
        Red,
        Green,
    }

    crate::param_enum!(Color { Red => "RED", Green => "GREEN" });

    fn param(key: &str, value: &str, param_type: ParamType) -> Parameter {
        Parameter::new(key).with_value(value).with_type(param_type)
    }

    #[test]
    fn test_number_conversions() {
        let p = param("n", "42", ParamType::Number);
        assert_eq!(convert::<i32>(&p).unwrap(), 42);
        assert_eq!(convert::<i64>(&p).unwrap(), 42);
        assert_eq!(convert::<f64>(&p).unwrap(), 42.0);
        assert_eq!(
            convert::<BigDecimal>(&p).unwrap(),
            BigDecimal::from_str("42").unwrap()
        );
        assert_eq!(convert::<String>(&p).unwrap(), "42");
    }

    #[test]
    fn test_number_trim_and_strictness() {
        assert_eq!(
            convert::<i32>(&param("n", "  7  ", ParamType::Number)).unwrap(),
            7
        );

        let err = convert::<i32>(&param("n", "7.5", ParamType::Number)).unwrap_err();
        assert_eq!(err.expected(), "NUMBER");
        assert!(convert::<i64>(&param("n", "7.5", ParamType::Number)).is_err());
        assert!(convert::<i32>(&param("n", "abc", ParamType::Number)).is_err());
        assert!(convert::<i32>(&param("n", "12abc", ParamType::Number)).is_err());
        assert!(convert::<i32>(&param("n", "99999999999", ParamType::Number)).is_err());
        assert_eq!(
            convert::<f64>(&param("n", "7.5", ParamType::Number)).unwrap(),
            7.5
        );
    }

    #[test]
    fn test_number_rejects_digit_separators() {
        for raw in ["1_000", "1_0.5", "_1"] {
            let err = convert::<BigDecimal>(&param("n", raw, ParamType::Number)).unwrap_err();
            assert_eq!(err.expected(), "NUMBER", "raw={raw:?}");
            assert!(convert::<f64>(&param("n", raw, ParamType::Number)).is_err());
        }

        for (raw, expected) in [("+1.50", "1.50"), (".5", "0.5"), ("1e3", "1000")] {
            assert_eq!(
                convert::<BigDecimal>(&param("n", raw, ParamType::Number)).unwrap(),
                BigDecimal::from_str(expected).unwrap(),
                "raw={raw:?}"
            );
        }
    }

    #[test]
    fn test_float_rejects_non_finite() {
        for raw in ["inf", "-infinity", "NaN", "1e400"] {
            let err = convert::<f64>(&param("n", raw, ParamType::Number)).unwrap_err();
            assert_eq!(err.expected(), "NUMBER", "raw={raw:?}");
        }
        assert_eq!(
            convert::<f64>(&param("n", " -2.5e2 ", ParamType::Number)).unwrap(),
            -250.0
        );
    }

    #[test]
    fn test_number_raw_string_is_untrimmed() {
        let p = param("n", " 5 ", ParamType::Number);
        assert_eq!(convert::<String>(&p).unwrap(), " 5 ");
    }

    #[test]
    fn test_boolean_conversions() {
        for (raw, expected) in [
            ("true", true),
            ("1", true),
            (" TRUE ", true),
            ("false", false),
            ("0", false),
            ("False", false),
        ] {
            assert_eq!(
                convert::<bool>(&param("b", raw, ParamType::Boolean)).unwrap(),
                expected,
                "raw={raw:?}"
            );
        }
    }

    #[test]
    fn test_boolean_invalid() {
        for raw in ["yes", "no", "2", "", "on"] {
            let err = convert::<bool>(&param("b", raw, ParamType::Boolean)).unwrap_err();
            assert_eq!(err.expected(), "BOOLEAN");
        }
    }

    #[test]
    fn test_boolean_rejects_non_boolean_target() {
        let p = param("b", "true", ParamType::Boolean);
        let err = convert::<String>(&p).unwrap_err();
        assert_eq!(err.expected(), "BOOLEAN");
        assert!(convert::<i32>(&p).is_err());
    }

    #[test]
    fn test_duration_iso_and_short_forms() {
        let d = |raw: &str| convert::<Duration>(&param("t", raw, ParamType::Text)).unwrap();

        assert_eq!(d("PT15M"), Duration::from_secs(15 * 60));
        assert_eq!(d("pt1h30m"), Duration::from_secs(90 * 60));
        assert_eq!(d("P1DT2H"), Duration::from_secs(86_400 + 7_200));
        assert_eq!(d("P2D"), Duration::from_secs(2 * 86_400));
        assert_eq!(d("PT1.5S"), Duration::from_millis(1_500));
        assert_eq!(d("5s"), Duration::from_secs(5));
        assert_eq!(d("2m"), Duration::from_secs(120));
        assert_eq!(d("200ms"), Duration::from_millis(200));
        assert_eq!(d(" 3 H "), Duration::from_secs(3 * 3_600));
        assert_eq!(d("1d"), Duration::from_secs(86_400));
        assert_eq!(d("1500"), Duration::from_millis(1_500));
        assert_eq!(d("   "), Duration::ZERO);
    }

    #[test]
    fn test_duration_invalid() {
        for raw in ["abc", "P", "PT", "P1DT", "5 weeks", "-5", "1.5s"] {
            let err = convert::<Duration>(&param("t", raw, ParamType::Text)).unwrap_err();
            assert_eq!(err.expected(), "DURATION", "raw={raw:?}");
        }
    }

    #[test]
    fn test_duration_requires_text_type() {
        let err = convert::<Duration>(&param("t", "5s", ParamType::Number)).unwrap_err();
        assert_eq!(err.expected(), "NUMBER");
    }

    #[test]
    fn test_enum_case_insensitive() {
        let resolve = |raw: &str| convert_enum::<Color>(&param("c", raw, ParamType::Text));
        assert_eq!(resolve("GREEN").unwrap(), Color::Green);
        assert_eq!(resolve("green").unwrap(), Color::Green);
        assert_eq!(resolve("ReD").unwrap(), Color::Red);
        assert_eq!(resolve(" RED ").unwrap(), Color::Red);
    }

    #[test]
    fn test_enum_invalid() {
        let err = convert_enum::<Color>(&param("c", "blue", ParamType::Text)).unwrap_err();
        assert_eq!(err.expected(), "ENUM");
        assert_eq!(err.actual_value(), Some("blue"));
    }

    #[test]
    fn test_enum_through_convert() {
        assert_eq!(
            convert::<Color>(&param("c", "green", ParamType::Text)).unwrap(),
            Color::Green
        );
        // convert_enum ignores the declared type
        assert_eq!(
            convert_enum::<Color>(&param("c", "red", ParamType::Number)).unwrap(),
            Color::Red
        );
        assert_eq!(
            convert::<Color>(&param("c", "\"green\"", ParamType::Json)).unwrap(),
            Color::Green
        );
    }

    #[test]
    fn test_text_rejects_other_targets() {
        let err = convert::<i32>(&param("t", "5", ParamType::Text)).unwrap_err();
        assert_eq!(err.expected(), "TEXT");
        assert!(convert::<bool>(&param("t", "true", ParamType::Text)).is_err());
    }

    #[test]
    fn test_null_value() {
        let p = Parameter::new("k").with_type(ParamType::Number);
        assert_eq!(convert::<Option<i32>>(&p).unwrap(), None);

        let err = convert::<i32>(&p).unwrap_err();
        assert_eq!(err.expected(), "NUMBER");
        assert_eq!(err.echo(), "null");

        assert!(convert_list::<String>(&p).unwrap().is_empty());
        assert!(convert_enum::<Color>(&p).is_err());
    }

    #[test]
    fn test_list_comma_separated() {
        let out: Vec<String> = convert_list(&param("list", "a,b, c", ParamType::Text)).unwrap();
        assert_eq!(out, vec!["a", "b", "c"]);

        let out: Vec<String> = convert_list(&param("list", " ,a,, ,b,", ParamType::Text)).unwrap();
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn test_list_elements_use_declared_type() {
        let out: Vec<i64> = convert_list(&param("ids", "1, 2,3", ParamType::Number)).unwrap();
        assert_eq!(out, vec![1, 2, 3]);

        let err = convert_list::<i64>(&param("ids", "1,x,3", ParamType::Number)).unwrap_err();
        assert_eq!(err.expected(), "NUMBER");
        assert_eq!(err.actual_value(), Some("x"));

        let out: Vec<Duration> = convert_list(&param("d", "5s,PT1M", ParamType::Text)).unwrap();
        assert_eq!(out, vec![Duration::from_secs(5), Duration::from_secs(60)]);
    }

    #[test]
    fn test_list_blank_is_empty() {
        let out: Vec<i32> = convert_list(&param("list", "   ", ParamType::Number)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_json_typed_list() {
        let out: Vec<i32> = convert_list(&param("nums", "[1,2,3]", ParamType::Json)).unwrap();
        assert_eq!(out, vec![1, 2, 3]);

        let out: Vec<Option<String>> =
            convert_list(&param("names", r#"["a", null]"#, ParamType::Json)).unwrap();
        assert_eq!(out, vec![Some("a".to_string()), None]);

        let err = convert_list::<i32>(&param("nums", "[1,\"x\"]", ParamType::Json)).unwrap_err();
        assert_eq!(err.expected(), "JSON[]");

        let err = convert_list::<i32>(&param("nums", "{\"a\":1}", ParamType::Json)).unwrap_err();
        assert_eq!(err.expected(), "JSON[]");
    }

    #[test]
    fn test_json_struct_target() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Limits {
            max: u32,
            burst: Option<u32>,
        }

        let p = param("limits", r#"{"max": 10}"#, ParamType::Json);
        let Json(limits) = convert::<Json<Limits>>(&p).unwrap();
        assert_eq!(limits, Limits { max: 10, burst: None });

        let err = convert::<Json<Limits>>(&param("limits", "{not-json", ParamType::Json)).unwrap_err();
        assert_eq!(err.expected(), "JSON");
    }

    #[test]
    fn test_json_primitives() {
        assert_eq!(convert::<i32>(&param("j", "5", ParamType::Json)).unwrap(), 5);
        assert_eq!(
            convert::<String>(&param("j", "\"x\"", ParamType::Json)).unwrap(),
            "x"
        );
        // A JSON parameter only yields a string when it holds a JSON string
        assert!(convert::<String>(&param("j", "{}", ParamType::Json)).is_err());
        assert_eq!(
            convert::<BigDecimal>(&param("j", "1.25", ParamType::Json)).unwrap(),
            BigDecimal::from_str("1.25").unwrap()
        );
    }

    #[test]
    fn test_to_map() {
        let m = to_map("k", r#"{"a":1,"b":"x"}"#).unwrap();
        assert_eq!(m["a"].as_i64(), Some(1));
        assert_eq!(m["b"], "x");

        let err = to_map("k", "{not-json").unwrap_err();
        assert_eq!(err.expected(), "JSON");
        assert!(to_map("k", "[1]").is_err());
    }

    #[test]
    fn test_to_map_list() {
        let arr = to_map_list("k", r#"[{"a":1},{"a":2}]"#).unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["a"].as_i64(), Some(1));

        let err = to_map_list("k", "{not-json").unwrap_err();
        assert_eq!(err.expected(), "JSON[]");
    }

    #[test]
    fn test_mismatch_carries_key_and_value() {
        let err = convert::<i32>(&param("max_retry", "not-a-number", ParamType::Number)).unwrap_err();
        assert_eq!(err.key(), "max_retry");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'max_retry': expected=NUMBER, actual=not-a-number"
        );
    }
}
