//! The parameter store.
//!
//! [`SystemParams`] is stateless between calls: every read goes to the
//! repository, every write issues at most one upsert.

use std::time::Duration;

use bigdecimal::BigDecimal;
use sysparam_storage::{DynRepository, ParamType, Parameter, StorageError, Tag};
use tracing::{debug, info, warn};

use crate::converter::{self, FromParam, ParamEnum, ParamMap};
use crate::definition::{ParamDefinition, TagDefinition};
use crate::error::{ParamError, Result, TypeMismatch};
use crate::grouping::{self, TagGroupView, normalize_tag_code};
use crate::options::StoreOptions;
use crate::value::{ParamValue, normalize};

/// Typed access to system parameters held by a [`ParamRepository`].
///
/// [`ParamRepository`]: sysparam_storage::ParamRepository
#[derive(Clone)]
pub struct SystemParams {
    repository: DynRepository,
    options: StoreOptions,
}

impl std::fmt::Debug for SystemParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemParams")
            .field("backend", &self.repository.backend_name())
            .field("options", &self.options)
            .finish()
    }
}

impl SystemParams {
    pub fn new(repository: DynRepository) -> Self {
        Self::with_options(repository, StoreOptions::default())
    }

    pub fn with_options(repository: DynRepository, options: StoreOptions) -> Self {
        debug!(
            "System params store created on {} backend",
            repository.backend_name()
        );
        Self {
            repository,
            options,
        }
    }

    pub fn repository(&self) -> &DynRepository {
        &self.repository
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    // ==================== Reads ====================

    /// Raw value of a parameter. `None` when the stored value is null.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.fetch(key)?.value)
    }

    /// Raw value, or `None` when the parameter is absent or null.
    pub fn get_optional(&self, key: &str) -> Result<Option<String>> {
        Ok(self.find(key)?.and_then(|p| p.value))
    }

    pub fn get_or_default(&self, key: &str, default: impl Into<String>) -> Result<String> {
        Ok(self.get_optional(key)?.unwrap_or_else(|| default.into()))
    }

    /// Converts a parameter according to its declared type.
    pub fn get_as<T: FromParam>(&self, key: &str) -> Result<T> {
        let param = self.fetch(key)?;
        converter::convert(&param).map_err(|m| self.mismatch(m))
    }

    pub fn get_as_or_default<T: FromParam>(&self, key: &str, default: T) -> Result<T> {
        recover(key, self.get_as(key), default)
    }

    pub fn get_duration(&self, key: &str) -> Result<Duration> {
        self.get_as(key)
    }

    pub fn get_duration_or_default(&self, key: &str, default: Duration) -> Result<Duration> {
        recover(key, self.get_duration(key), default)
    }

    /// Resolves a parameter to an enum variant, ignoring its declared type.
    pub fn get_enum<E: ParamEnum>(&self, key: &str) -> Result<E> {
        let param = self.fetch(key)?;
        converter::convert_enum(&param).map_err(|m| self.mismatch(m))
    }

    pub fn get_enum_or_default<E: ParamEnum>(&self, key: &str, default: E) -> Result<E> {
        recover(key, self.get_enum(key), default)
    }

    pub fn get_list<T: FromParam>(&self, key: &str) -> Result<Vec<T>> {
        let param = self.fetch(key)?;
        converter::convert_list(&param).map_err(|m| self.mismatch(m))
    }

    pub fn get_list_or_default<T: FromParam>(&self, key: &str, default: Vec<T>) -> Result<Vec<T>> {
        recover(key, self.get_list(key), default)
    }

    /// Decodes the raw value as a JSON object, whatever the declared type.
    pub fn get_map(&self, key: &str) -> Result<ParamMap> {
        let raw = self.require_value(key, "JSON")?;
        converter::to_map(key, &raw).map_err(|m| self.mismatch(m))
    }

    pub fn get_map_or_default(&self, key: &str, default: ParamMap) -> Result<ParamMap> {
        recover(key, self.get_map(key), default)
    }

    /// Decodes the raw value as a JSON array of objects.
    pub fn get_map_list(&self, key: &str) -> Result<Vec<ParamMap>> {
        let raw = self.require_value(key, "JSON[]")?;
        converter::to_map_list(key, &raw).map_err(|m| self.mismatch(m))
    }

    pub fn get_map_list_or_default(
        &self,
        key: &str,
        default: Vec<ParamMap>,
    ) -> Result<Vec<ParamMap>> {
        recover(key, self.get_map_list(key), default)
    }

    /// Every parameter grouped under its tag, groups ordered by priority.
    pub fn get_all_grouped_by_tag(&self) -> Result<Vec<TagGroupView>> {
        let params = self.all_params()?;
        let tags = self.all_tags()?;
        Ok(grouping::group_by_tag(tags, params))
    }

    /// The group for one tag code. `None` is a soft miss.
    pub fn get_by_tag(&self, tag_code: &str) -> Result<Option<TagGroupView>> {
        let params = self.all_params()?;
        let tags = self.all_tags()?;

        let view = grouping::select_tag(tag_code, &tags, params);
        if view.is_none() {
            debug!("No tag group for code: {}", tag_code);
        }
        Ok(view)
    }

    // ==================== Writes ====================

    /// Creates or fully replaces a parameter.
    pub fn set(&self, definition: ParamDefinition) -> Result<()> {
        let ParamDefinition {
            key,
            value,
            param_type,
            tag_code,
            display_priority,
            description,
        } = definition;
        require_key(&key)?;

        let tag_code = normalize_tag_code(tag_code.as_deref());
        let value = normalize(value, param_type)?;
        self.validate_write(&key, value.as_deref(), param_type)?;

        let mut param = self
            .find(&key)?
            .unwrap_or_else(|| Parameter::new(key.as_str()));
        param.value = value;
        param.param_type = Some(param_type);
        param.tag_code = Some(tag_code);
        param.display_priority = display_priority;
        param.description = description;

        self.save_param(&param)?;
        info!("Parameter set: {} ({})", key, param_type);
        Ok(())
    }

    /// Replaces only the value of an existing parameter, keeping its
    /// declared type and metadata.
    pub fn update(&self, key: &str, value: impl Into<ParamValue>) -> Result<()> {
        require_key(key)?;

        let mut param = self.fetch(key)?;
        let param_type = param.effective_type();
        let value = normalize(value.into(), param_type)?;
        self.validate_write(key, value.as_deref(), param_type)?;

        param.value = value;
        self.save_param(&param)?;
        info!("Parameter updated: {}", key);
        Ok(())
    }

    /// Creates the parameter if absent; otherwise reconciles its metadata
    /// without touching the stored value.
    ///
    /// A differing declared type migrates the parameter: the stored value is
    /// re-validated under the requested type. Returns whether anything was
    /// persisted.
    pub fn ensure_param(&self, definition: ParamDefinition) -> Result<bool> {
        let ParamDefinition {
            key,
            value,
            param_type,
            tag_code,
            display_priority,
            description,
        } = definition;
        require_key(&key)?;

        let tag_code = normalize_tag_code(tag_code.as_deref());

        let Some(mut existing) = self.find(&key)? else {
            let value = normalize(value, param_type)?;
            self.validate_write(&key, value.as_deref(), param_type)?;

            let created = Parameter {
                key: key.clone(),
                value,
                description,
                param_type: Some(param_type),
                tag_code: Some(tag_code),
                display_priority,
            };
            self.save_param(&created)?;
            info!("Parameter created: {} ({})", key, param_type);
            return Ok(true);
        };

        let mut changed = false;

        if existing.description != description {
            existing.description = description;
            changed = true;
        }

        if existing.param_type != Some(param_type) {
            self.validate_write(&key, existing.value.as_deref(), param_type)?;
            warn!(
                "Parameter {} migrated from {} to {}",
                key,
                existing.param_type.map_or("untyped", ParamType::label),
                param_type
            );
            existing.param_type = Some(param_type);
            changed = true;
        }

        if normalize_tag_code(existing.tag_code.as_deref()) != tag_code {
            existing.tag_code = Some(tag_code);
            changed = true;
        }

        if existing.display_priority != display_priority {
            existing.display_priority = display_priority;
            changed = true;
        }

        if changed {
            self.save_param(&existing)?;
            info!("Parameter metadata reconciled: {}", key);
        } else {
            debug!("Parameter already up to date: {}", key);
        }
        Ok(changed)
    }

    /// Creates the tag if absent; otherwise overwrites whichever of name,
    /// description and priority differ. Returns whether anything was
    /// persisted.
    pub fn ensure_tag(&self, definition: TagDefinition) -> Result<bool> {
        let TagDefinition {
            code,
            name,
            description,
            priority,
        } = definition;

        let code = code.trim();
        if code.is_empty() {
            return Err(ParamError::invalid_argument("tag code required"));
        }

        let existing = self
            .all_tags()?
            .into_iter()
            .find(|t| normalize_tag_code(Some(&t.tag_code)) == code);

        let Some(mut tag) = existing else {
            let created = Tag {
                tag_code: code.to_string(),
                tag_name: name,
                description,
                priority,
            };
            self.save_tag(&created)?;
            info!("Tag created: {}", code);
            return Ok(true);
        };

        let mut changed = false;

        if tag.tag_name != name {
            tag.tag_name = name;
            changed = true;
        }
        if tag.description != description {
            tag.description = description;
            changed = true;
        }
        if tag.priority != priority {
            tag.priority = priority;
            changed = true;
        }

        if changed {
            self.save_tag(&tag)?;
            info!("Tag updated: {}", code);
        } else {
            debug!("Tag already up to date: {}", code);
        }
        Ok(changed)
    }

    // ==================== Helpers ====================

    fn find(&self, key: &str) -> Result<Option<Parameter>> {
        self.repository
            .find_by_key(key)
            .map_err(|e| self.storage_failure("find", e))
    }

    fn all_params(&self) -> Result<Vec<Parameter>> {
        self.repository
            .find_all_params()
            .map_err(|e| self.storage_failure("list params", e))
    }

    fn all_tags(&self) -> Result<Vec<Tag>> {
        self.repository
            .find_all_tags()
            .map_err(|e| self.storage_failure("list tags", e))
    }

    fn save_param(&self, param: &Parameter) -> Result<()> {
        self.repository
            .save_param(param)
            .map_err(|e| self.storage_failure("save param", e))
    }

    fn save_tag(&self, tag: &Tag) -> Result<()> {
        self.repository
            .save_tag(tag)
            .map_err(|e| self.storage_failure("save tag", e))
    }

    fn storage_failure(&self, operation: &str, error: StorageError) -> ParamError {
        warn!(
            "Repository {} failed on {} backend [{}]: {error}",
            operation,
            self.repository.backend_name(),
            error.category()
        );
        ParamError::Storage(error)
    }

    fn fetch(&self, key: &str) -> Result<Parameter> {
        self.find(key)?
            .ok_or_else(|| ParamError::not_found(key))
    }

    /// Raw value for the JSON readers; a null value is a mismatch.
    fn require_value(&self, key: &str, expected: &str) -> Result<String> {
        self.fetch(key)?
            .value
            .ok_or_else(|| self.mismatch(TypeMismatch::new(key, expected, None)))
    }

    /// Rejects text a reader of the declared type could not convert.
    ///
    /// TEXT and JSON are stored unchecked. A null value always passes.
    fn validate_write(&self, key: &str, value: Option<&str>, param_type: ParamType) -> Result<()> {
        let probe = Parameter {
            key: key.to_string(),
            value: value.map(str::to_string),
            param_type: Some(param_type),
            ..Default::default()
        };

        let checked = match param_type {
            ParamType::Text | ParamType::Json => Ok(()),
            ParamType::Number => converter::convert::<Option<BigDecimal>>(&probe).map(drop),
            ParamType::Boolean => converter::convert::<Option<bool>>(&probe).map(drop),
        };
        checked.map_err(|m| self.mismatch(m))
    }

    fn mismatch(&self, mismatch: TypeMismatch) -> ParamError {
        ParamError::from(mismatch).with_echo_limit(self.options.mismatch_echo_limit)
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(ParamError::invalid_argument("key required"));
    }
    Ok(())
}

/// Replaces not-found and type-mismatch failures with the default.
fn recover<T>(key: &str, result: Result<T>, default: T) -> Result<T> {
    match result {
        Err(e) if e.is_recoverable() => {
            debug!("Using default for {}: {e}", key);
            Ok(default)
        }
        other => other,
    }
}
