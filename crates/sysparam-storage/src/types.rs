//! Record types exchanged with the persistence port.
//!
//! Parameter values are always canonical text; the declared [`ParamType`]
//! says how that text is interpreted on read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical type a parameter is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParamType {
    /// Free text, durations and enum names.
    #[default]
    Text,
    /// Integers, floats and decimals.
    Number,
    /// `true`/`false` or `1`/`0`.
    Boolean,
    /// Structured JSON documents.
    Json,
}

impl ParamType {
    /// Label used in diagnostics (`"TEXT"`, `"NUMBER"`, ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Json => "JSON",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a declared type name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown parameter type: {0}")]
pub struct ParseParamTypeError(pub String);

impl FromStr for ParamType {
    type Err = ParseParamTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Ok(Self::Text),
            "NUMBER" => Ok(Self::Number),
            "BOOLEAN" => Ok(Self::Boolean),
            "JSON" => Ok(Self::Json),
            _ => Err(ParseParamTypeError(s.to_string())),
        }
    }
}

/// A stored system parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique, case-sensitive key.
    pub key: String,
    /// Canonical text value.
    #[serde(default)]
    pub value: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared type. Absent means TEXT.
    #[serde(default, rename = "type")]
    pub param_type: Option<ParamType>,
    /// Grouping tag code.
    #[serde(default)]
    pub tag_code: Option<String>,
    /// Ordering hint inside a tag group. Absent sorts last.
    #[serde(default)]
    pub display_priority: Option<i32>,
}

impl Parameter {
    /// Creates an empty parameter with the given key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Sets the raw value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = Some(param_type);
        self
    }

    /// Sets the tag code as given (no normalization).
    #[must_use]
    pub fn with_tag(mut self, tag_code: impl Into<String>) -> Self {
        self.tag_code = Some(tag_code.into());
        self
    }

    /// Sets the display priority.
    #[must_use]
    pub fn with_display_priority(mut self, priority: i32) -> Self {
        self.display_priority = Some(priority);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declared type, defaulting to TEXT when absent.
    #[must_use]
    pub fn effective_type(&self) -> ParamType {
        self.param_type.unwrap_or_default()
    }
}

/// Display metadata for a tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag code.
    pub tag_code: String,
    /// Display label. Views fall back to the code when absent.
    #[serde(default)]
    pub tag_name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Group ordering. Absent sorts last.
    #[serde(default)]
    pub priority: Option<i32>,
}

impl Tag {
    /// Creates a tag with only a code.
    #[must_use]
    pub fn new(tag_code: impl Into<String>) -> Self {
        Self {
            tag_code: tag_code.into(),
            ..Default::default()
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.tag_name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_labels_and_parse() {
        assert_eq!(ParamType::Boolean.label(), "BOOLEAN");
        assert_eq!(ParamType::Json.to_string(), "JSON");
        assert_eq!(" number ".parse::<ParamType>(), Ok(ParamType::Number));
        assert_eq!("Json".parse::<ParamType>(), Ok(ParamType::Json));
        assert!("decimal".parse::<ParamType>().is_err());
    }

    #[test]
    fn test_effective_type_defaults_to_text() {
        let param = Parameter::new("k");
        assert_eq!(param.param_type, None);
        assert_eq!(param.effective_type(), ParamType::Text);

        let param = param.with_type(ParamType::Number);
        assert_eq!(param.effective_type(), ParamType::Number);
    }

    #[test]
    fn test_parameter_serde_shape() {
        let param = Parameter::new("max_retry")
            .with_value("5")
            .with_type(ParamType::Number)
            .with_tag("SYSTEM")
            .with_display_priority(10);

        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["type"], "NUMBER");
        assert_eq!(json["tag_code"], "SYSTEM");

        let back: Parameter = serde_json::from_value(json).unwrap();
        assert_eq!(back, param);
    }

    #[test]
    fn test_tag_builder() {
        let tag = Tag::new("SYSTEM").with_name("System").with_priority(1);
        assert_eq!(tag.tag_name.as_deref(), Some("System"));
        assert_eq!(tag.priority, Some(1));
        assert_eq!(tag.description, None);
    }
}
