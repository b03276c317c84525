//! In-memory repository backend for the system parameter store.
//!
//! This crate provides an in-memory implementation of the `ParamRepository`
//! trait from `sysparam-storage`, using papaya lock-free HashMap for
//! concurrent access.
//!
//! # Example
//!
//! ```ignore
//! use sysparam_db_memory::InMemoryRepository;
//! use sysparam_storage::{ParamRepository, Parameter};
//!
//! let repo = InMemoryRepository::new();
//! repo.save_param(&Parameter::new("max_retry").with_value("5"))?;
//! assert_eq!(repo.stats().param_saves, 1);
//! ```

pub mod repository;

// Re-export the port for convenience
pub use sysparam_storage::{ParamRepository, StorageError};

pub use repository::{InMemoryRepository, RepositoryStats};

/// Type alias for a shareable repository instance.
pub type DynRepository = sysparam_storage::DynRepository;

/// Creates a new in-memory repository behind the shared trait object.
pub fn create_repository() -> DynRepository {
    std::sync::Arc::new(InMemoryRepository::new())
}
