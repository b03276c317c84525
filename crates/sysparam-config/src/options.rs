//! Store-wide tunables, deserializable from the `[options]` manifest table.

use serde::{Deserialize, Serialize};

use crate::error::DEFAULT_MAX_VALUE_LENGTH;

/// Tunables for a [`SystemParams`](crate::SystemParams) store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Maximum characters of a raw value echoed in type-mismatch messages.
    /// Zero disables truncation.
    #[serde(default = "default_mismatch_echo_limit")]
    pub mismatch_echo_limit: usize,
}

fn default_mismatch_echo_limit() -> usize {
    DEFAULT_MAX_VALUE_LENGTH
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            mismatch_echo_limit: default_mismatch_echo_limit(),
        }
    }
}

impl StoreOptions {
    #[must_use]
    pub fn with_mismatch_echo_limit(mut self, limit: usize) -> Self {
        self.mismatch_echo_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        assert_eq!(StoreOptions::default().mismatch_echo_limit, 300);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let opts: StoreOptions = toml::from_str("").unwrap();
        assert_eq!(opts, StoreOptions::default());

        let opts: StoreOptions = toml::from_str("mismatch_echo_limit = 20").unwrap();
        assert_eq!(opts.mismatch_echo_limit, 20);
    }
}
