use papaya::HashMap as PapayaHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use sysparam_storage::{ParamRepository, Parameter, StorageError, StorageResult, Tag};
use tracing::debug;

/// Counters for upserts issued against an [`InMemoryRepository`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryStats {
    /// Number of successful `save_param` calls.
    pub param_saves: u64,
    /// Number of successful `save_tag` calls.
    pub tag_saves: u64,
}

/// In-memory parameter repository using papaya lock-free HashMaps.
///
/// This repository provides:
/// - Lock-free concurrent access via papaya::HashMap
/// - Upsert semantics keyed by parameter key / tag code
/// - Deterministic listing order (sorted by key / tag code)
/// - Save counters for observing how many writes a caller issued
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    params: PapayaHashMap<String, Parameter>,
    tags: PapayaHashMap<String, Tag>,
    param_saves: AtomicU64,
    tag_saves: AtomicU64,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with parameters.
    ///
    /// Seeding does not count towards [`RepositoryStats`].
    pub fn with_params(params: impl IntoIterator<Item = Parameter>) -> Self {
        let repo = Self::new();
        {
            let guard = repo.params.pin();
            for param in params {
                guard.insert(param.key.clone(), param);
            }
        }
        repo
    }

    /// Adds tag metadata to the repository without counting a save.
    #[must_use]
    pub fn with_tags(self, tags: impl IntoIterator<Item = Tag>) -> Self {
        {
            let guard = self.tags.pin();
            for tag in tags {
                guard.insert(tag.tag_code.clone(), tag);
            }
        }
        self
    }

    /// Returns a snapshot of the save counters.
    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            param_saves: self.param_saves.load(Ordering::SeqCst),
            tag_saves: self.tag_saves.load(Ordering::SeqCst),
        }
    }

    /// Number of stored parameters.
    pub fn len(&self) -> usize {
        self.params.pin().len()
    }

    /// Returns true if no parameters are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored tags.
    pub fn tag_count(&self) -> usize {
        self.tags.pin().len()
    }

    /// Removes every parameter and tag. Counters are left untouched.
    pub fn clear(&self) {
        self.params.pin().clear();
        self.tags.pin().clear();
    }
}

impl ParamRepository for InMemoryRepository {
    fn find_by_key(&self, key: &str) -> StorageResult<Option<Parameter>> {
        Ok(self.params.pin().get(key).cloned())
    }

    fn find_all_params(&self) -> StorageResult<Vec<Parameter>> {
        let guard = self.params.pin();
        let mut params: Vec<Parameter> = guard.iter().map(|(_, p)| p.clone()).collect();
        params.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(params)
    }

    fn find_all_tags(&self) -> StorageResult<Vec<Tag>> {
        let guard = self.tags.pin();
        let mut tags: Vec<Tag> = guard.iter().map(|(_, t)| t.clone()).collect();
        tags.sort_by(|a, b| a.tag_code.cmp(&b.tag_code));
        Ok(tags)
    }

    fn save_param(&self, param: &Parameter) -> StorageResult<()> {
        if param.key.trim().is_empty() {
            return Err(StorageError::invalid_record("parameter key is blank"));
        }

        self.params.pin().insert(param.key.clone(), param.clone());
        self.param_saves.fetch_add(1, Ordering::SeqCst);
        debug!("Saved parameter {}", param.key);
        Ok(())
    }

    fn save_tag(&self, tag: &Tag) -> StorageResult<()> {
        if tag.tag_code.trim().is_empty() {
            return Err(StorageError::invalid_record("tag code is blank"));
        }

        self.tags.pin().insert(tag.tag_code.clone(), tag.clone());
        self.tag_saves.fetch_add(1, Ordering::SeqCst);
        debug!("Saved tag {}", tag.tag_code);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}
