//! Request DTOs for the store server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::store::{prefix_end, validate_key, validate_value};

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The key
    pub key: String,
    /// The value to store
    pub value: String,
}

impl SetRequest {
    /// Validates the request data against the store's key/value rules.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(self.key.as_bytes())
            .and_then(|_| validate_value(self.value.as_bytes()))
            .err()
            .map(|err| err.to_string())
    }
}

/// Query string for range iteration (GET /range)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    /// Inclusive lower bound
    #[serde(default)]
    pub start: Option<String>,
    /// Exclusive upper bound
    #[serde(default)]
    pub end: Option<String>,
    /// Restricts the range to keys with this prefix; overrides `start`/`end`
    #[serde(default)]
    pub prefix: Option<String>,
    /// Iterate in descending order
    #[serde(default)]
    pub reverse: bool,
    /// Maximum number of pairs to return
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RangeQuery {
    /// Resolves the half-open byte range to iterate.
    pub fn bounds(&self) -> (Option<Vec<u8>>, Option<Vec<u8>>) {
        match self.prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => (Some(prefix.as_bytes().to_vec()), prefix_end(prefix.as_bytes())),
            None => (
                self.start.as_ref().map(|s| s.as_bytes().to_vec()),
                self.end.as_ref().map(|e| e.as_bytes().to_vec()),
            ),
        }
    }
}
