//! Response DTOs for the store server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// A single pair in a range response
#[derive(Debug, Clone, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Response body for range iteration (GET /range)
#[derive(Debug, Clone, Serialize)]
pub struct RangeResponse {
    /// Pairs in iteration order
    pub pairs: Vec<KeyValue>,
    /// Number of pairs returned
    pub count: usize,
}

impl RangeResponse {
    /// Creates a new RangeResponse from raw pairs
    pub fn new(pairs: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        let pairs: Vec<KeyValue> = pairs
            .into_iter()
            .map(|(key, value)| KeyValue {
                key: String::from_utf8_lossy(&key).into_owned(),
                value: String::from_utf8_lossy(&value).into_owned(),
            })
            .collect();
        Self {
            count: pairs.len(),
            pairs,
        }
    }
}

/// Response body for write-back operations (POST /write, /flush, /write-through/:levels)
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse {
    /// Success message
    pub message: String,
    /// Pending writes in the top layer before the operation
    pub pending: usize,
}

impl WriteResponse {
    /// Creates a new WriteResponse
    pub fn new(operation: &str, pending: usize) -> Self {
        Self {
            message: format!("{} completed, {} pending write(s) applied", operation, pending),
            pending,
        }
    }
}

/// Response body for the clear operation (POST /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Entries remaining in the top layer
    pub remaining: usize,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new(remaining: usize) -> Self {
        Self {
            message: "Clean entries cleared".to_string(),
            remaining,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Statistics of the top cache layer
    #[serde(flatten)]
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Number of cache layers over the base store
    pub depth: usize,
    /// Number of entries in the base store
    pub base_entries: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(cache: CacheStats, depth: usize, base_entries: usize) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            depth,
            base_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
