//! Typed system parameter store for sysparam
//!
//! Parameters are stored as canonical text together with a declared type
//! (TEXT, NUMBER, BOOLEAN or JSON). This crate converts that text to typed
//! values on read, normalizes and validates typed values on write, and
//! groups parameters by tag for display.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   get_as / set    ┌──────────────┐
//! │    caller    │ ────────────────▶ │ SystemParams │
//! └──────────────┘                   └──────┬───────┘
//!                                           │
//!                  ┌────────────────────────┼─────────────────────┐
//!                  ▼                        ▼                     ▼
//!          ┌──────────────┐        ┌─────────────────┐    ┌──────────────┐
//!          │  converter   │        │ ParamRepository │    │   grouping   │
//!          │ (FromParam)  │        │   (storage)     │    │ (TagGroup…)  │
//!          └──────────────┘        └─────────────────┘    └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sysparam_config::{ParamDefinition, SystemParams};
//! use sysparam_db_memory::InMemoryRepository;
//!
//! let params = SystemParams::new(Arc::new(InMemoryRepository::new()));
//! params.set(ParamDefinition::number("max_retry").value(5).tag("SYSTEM"))?;
//!
//! let retries: i32 = params.get_as("max_retry")?;
//! let timeout = params.get_duration_or_default("timeout", Duration::from_secs(30))?;
//! ```

pub mod bootstrap;
pub mod converter;
pub mod definition;
pub mod error;
pub mod grouping;
pub mod options;
pub mod service;
pub mod value;

pub use bootstrap::{BootstrapManifest, BootstrapReport, ParamSeed};
pub use converter::{FromParam, Json, ParamEnum, ParamMap};
pub use definition::{ParamDefinition, TagDefinition};
pub use error::{ParamError, Result, TypeMismatch};
pub use grouping::{TagGroupView, UNGROUPED};
pub use options::StoreOptions;
pub use service::SystemParams;
pub use value::ParamValue;

// Re-export the port so callers need a single dependency
pub use sysparam_storage::{
    DynRepository, ParamRepository, ParamType, Parameter, StorageError, Tag,
};
