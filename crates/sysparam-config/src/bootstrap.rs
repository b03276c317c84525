//! Declarative seeding from TOML manifests.
//!
//! ```toml
//! [options]
//! mismatch_echo_limit = 120
//!
//! [[tags]]
//! code = "SYSTEM"
//! name = "System"
//! priority = 1
//!
//! [[params]]
//! key = "max_retry"
//! value = 5
//! type = "NUMBER"
//! tag = "SYSTEM"
//! display_priority = 1
//! ```
//!
//! Manifests go through `ensure_tag` / `ensure_param`, so applying one twice
//! persists nothing the second time and never overwrites stored values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sysparam_storage::{DynRepository, ParamType};
use tracing::{debug, info};

use crate::definition::{ParamDefinition, TagDefinition};
use crate::error::{ParamError, Result};
use crate::options::StoreOptions;
use crate::service::SystemParams;
use crate::value::ParamValue;

/// Tags and parameters an application expects to exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapManifest {
    #[serde(default)]
    pub options: Option<StoreOptions>,
    #[serde(default)]
    pub tags: Vec<TagDefinition>,
    #[serde(default)]
    pub params: Vec<ParamSeed>,
}

/// One `[[params]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSeed {
    pub key: String,
    /// Initial value; any TOML value.
    #[serde(default)]
    pub value: Option<toml::Value>,
    #[serde(default, rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub display_priority: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ParamSeed {
    /// The write-side definition this seed describes.
    pub fn definition(&self) -> Result<ParamDefinition> {
        let value = match &self.value {
            Some(v) => toml_to_param_value(v)?,
            None => ParamValue::Null,
        };

        let mut definition = ParamDefinition::new(self.key.as_str(), self.param_type)
            .value(value)
            .display_priority(self.display_priority);
        definition.tag_code = self.tag.clone();
        definition.description = self.description.clone();
        Ok(definition)
    }
}

/// How many records applying a manifest persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub tags_saved: usize,
    pub params_saved: usize,
}

impl BootstrapReport {
    /// True when the repository already matched the manifest.
    pub fn is_noop(&self) -> bool {
        self.tags_saved == 0 && self.params_saved == 0
    }
}

impl BootstrapManifest {
    /// Parse from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ParamError::bootstrap(format!("TOML parse error: {e}")))
    }

    /// Reads a manifest file. A missing file is an empty manifest.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!("Bootstrap manifest does not exist: {:?}", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let manifest = Self::from_toml(&content)?;
        debug!(
            "Loaded bootstrap manifest {:?}: {} tags, {} params",
            path,
            manifest.tags.len(),
            manifest.params.len()
        );
        Ok(manifest)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.params.is_empty()
    }

    /// Options declared by the manifest, or the defaults.
    pub fn store_options(&self) -> StoreOptions {
        self.options.unwrap_or_default()
    }
}

impl SystemParams {
    /// Creates a store configured by the manifest's options and applies it.
    pub fn bootstrap(
        repository: DynRepository,
        manifest: &BootstrapManifest,
    ) -> Result<(Self, BootstrapReport)> {
        let params = Self::with_options(repository, manifest.store_options());
        let report = params.apply_manifest(manifest)?;
        Ok((params, report))
    }

    /// Ensures every tag, then every parameter, of the manifest.
    ///
    /// Stops at the first failing entry; entries before it stay persisted.
    pub fn apply_manifest(&self, manifest: &BootstrapManifest) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();

        for tag in &manifest.tags {
            if self.ensure_tag(tag.clone())? {
                report.tags_saved += 1;
            }
        }

        for seed in &manifest.params {
            if self.ensure_param(seed.definition()?)? {
                report.params_saved += 1;
            }
        }

        info!(
            "Bootstrap manifest applied: {} tags, {} params saved",
            report.tags_saved, report.params_saved
        );
        Ok(report)
    }
}

/// Strings stay text, scalars stay typed, arrays and tables become JSON.
fn toml_to_param_value(value: &toml::Value) -> Result<ParamValue> {
    let converted = match value {
        toml::Value::String(s) => ParamValue::Text(s.clone()),
        toml::Value::Integer(n) => ParamValue::Integer(*n),
        toml::Value::Float(n) => ParamValue::Float(*n),
        toml::Value::Boolean(b) => ParamValue::Bool(*b),
        toml::Value::Datetime(dt) => ParamValue::Text(dt.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => ParamValue::json(value)?,
    };
    Ok(converted)
}
