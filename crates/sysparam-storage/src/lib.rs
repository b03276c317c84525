//! # sysparam-storage
//!
//! Persistence port for the system parameter store.
//!
//! This crate defines the trait and record types that all repository backends
//! must implement. It does not contain any implementations - those are
//! provided by separate crates.
//!
//! ## Overview
//!
//! The main trait is [`ParamRepository`], which defines the contract for:
//! - Single-key lookup of a [`Parameter`]
//! - Listing all parameters and all [`Tag`] metadata
//! - Upserting parameters and tags
//!
//! ## Storage Backends
//!
//! To implement a backend, implement the [`ParamRepository`] trait:
//!
//! ```ignore
//! use sysparam_storage::{ParamRepository, Parameter, StorageError, StorageResult, Tag};
//!
//! struct MyRepository {
//!     // ...
//! }
//!
//! impl ParamRepository for MyRepository {
//!     fn find_by_key(&self, key: &str) -> StorageResult<Option<Parameter>> {
//!         // Implementation
//!     }
//!     // ... other methods
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::ParamRepository;
pub use types::{ParamType, Parameter, ParseParamTypeError, Tag};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shareable repository trait object.
pub type DynRepository = std::sync::Arc<dyn ParamRepository>;
