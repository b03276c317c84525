//! Error types for parameter access.
//!
//! Conversion failures all converge on [`TypeMismatch`], which echoes the
//! offending raw value capped at a configurable length.

use std::fmt;

use sysparam_storage::StorageError;

/// Default cap on how many characters of a raw value a mismatch echoes.
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 300;

/// A raw value that could not be coerced to the requested or declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    key: String,
    expected: String,
    actual: Option<String>,
    max_length: usize,
}

impl TypeMismatch {
    /// Creates a mismatch with the default echo cap.
    pub fn new(key: impl Into<String>, expected: impl Into<String>, actual: Option<&str>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
            actual: actual.map(str::to_owned),
            max_length: DEFAULT_MAX_VALUE_LENGTH,
        }
    }

    /// Overrides the echo cap. Zero disables truncation.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Parameter key the value belongs to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Expected kind label (`"NUMBER"`, `"DURATION"`, `"JSON[]"`, ...).
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// The full offending value, untruncated.
    pub fn actual_value(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    /// Echo cap applied when rendering.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// The offending value as rendered in messages: `null` when absent,
    /// truncated with `...` past the cap.
    pub fn echo(&self) -> String {
        let Some(actual) = self.actual.as_deref() else {
            return "null".to_string();
        };

        if self.max_length > 0 && actual.chars().count() > self.max_length {
            let cut: String = actual.chars().take(self.max_length).collect();
            format!("{cut}...")
        } else {
            actual.to_string()
        }
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value for '{}': expected={}, actual={}",
            self.key,
            self.expected,
            self.echo()
        )
    }
}

impl std::error::Error for TypeMismatch {}

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// No parameter is stored under the key.
    #[error("Parameter not found: {key}")]
    NotFound { key: String },

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    /// Caller misuse: blank key, bad coercion input, unserializable value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bootstrap error: {0}")]
    Bootstrap(String),
}

impl ParamError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn bootstrap(msg: impl Into<String>) -> Self {
        Self::Bootstrap(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// The two kinds the `*_or_default` readers replace with a default.
    pub fn is_recoverable(&self) -> bool {
        self.is_not_found() || self.is_type_mismatch()
    }

    /// Re-caps the echo of a type mismatch; other kinds pass through.
    #[must_use]
    pub(crate) fn with_echo_limit(self, max_length: usize) -> Self {
        match self {
            Self::TypeMismatch(m) => Self::TypeMismatch(m.with_max_length(max_length)),
            other => other,
        }
    }
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, ParamError>;
