//! The repository trait every parameter backend implements.

use crate::StorageResult;
use crate::types::{Parameter, Tag};

/// Persistence port for parameters and tag metadata.
///
/// The store above this trait never caches records: every read goes through
/// the repository again, and every write issues exactly one upsert (or none
/// for a no-op ensure). Implementations must be thread-safe (`Send + Sync`)
/// and own their own consistency; the store provides no locking, so two
/// concurrent writers to one key race and the last write wins.
///
/// # Example
///
/// ```ignore
/// use sysparam_storage::{ParamRepository, StorageResult};
///
/// fn describe(repo: &dyn ParamRepository, key: &str) -> StorageResult<Option<String>> {
///     Ok(repo.find_by_key(key)?.and_then(|p| p.description))
/// }
/// ```
pub trait ParamRepository: Send + Sync {
    /// Looks up a parameter by its exact key.
    ///
    /// Returns `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing keys.
    fn find_by_key(&self, key: &str) -> StorageResult<Option<Parameter>>;

    /// Returns every stored parameter.
    fn find_all_params(&self) -> StorageResult<Vec<Parameter>>;

    /// Returns every declared tag.
    fn find_all_tags(&self) -> StorageResult<Vec<Tag>>;

    /// Upserts a parameter keyed by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`](crate::StorageError::InvalidRecord) if the backend rejects the record.
    fn save_param(&self, param: &Parameter) -> StorageResult<()>;

    /// Upserts a tag keyed by `tag_code`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`](crate::StorageError::InvalidRecord) if the backend rejects the record.
    fn save_tag(&self, tag: &Tag) -> StorageResult<()>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
