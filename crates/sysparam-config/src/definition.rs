//! Write-side descriptions of parameters and tags.
//!
//! `set` and `ensure_param` take a [`ParamDefinition`]; `ensure_tag` takes a
//! [`TagDefinition`]. Both are plain builders.

use serde::{Deserialize, Serialize};
use sysparam_storage::ParamType;

use crate::value::ParamValue;

/// A parameter as a caller wants it to be.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDefinition {
    pub key: String,
    pub value: ParamValue,
    pub param_type: ParamType,
    /// Raw tag code; normalized by the store.
    pub tag_code: Option<String>,
    pub display_priority: Option<i32>,
    pub description: Option<String>,
}

impl ParamDefinition {
    /// Creates a definition with a null value and no metadata.
    pub fn new(key: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            key: key.into(),
            value: ParamValue::Null,
            param_type,
            tag_code: None,
            display_priority: None,
            description: None,
        }
    }

    pub fn text(key: impl Into<String>) -> Self {
        Self::new(key, ParamType::Text)
    }

    pub fn number(key: impl Into<String>) -> Self {
        Self::new(key, ParamType::Number)
    }

    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, ParamType::Boolean)
    }

    pub fn json(key: impl Into<String>) -> Self {
        Self::new(key, ParamType::Json)
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<ParamValue>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn tag(mut self, tag_code: impl Into<String>) -> Self {
        self.tag_code = Some(tag_code.into());
        self
    }

    #[must_use]
    pub fn display_priority(mut self, priority: impl Into<Option<i32>>) -> Self {
        self.display_priority = priority.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Tag metadata as a caller wants it to be.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagDefinition {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl TagDefinition {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: impl Into<Option<i32>>) -> Self {
        self.priority = priority.into();
        self
    }
}
