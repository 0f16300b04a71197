//! Store Module
//!
//! The ordered key-value store abstraction every layer of a stack speaks,
//! plus the optional capabilities a layer may expose to the layer above it.

mod memory;

use std::fmt;
use std::sync::Arc;

use crate::cache::CacheStore;
use crate::error::{Result, StoreError};

pub use memory::MemStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// A key-value pair yielded by iteration.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Lazy, finite, ordered sequence of pairs over a half-open range.
pub type KvIterator<'a> = Box<dyn Iterator<Item = Result<KvPair>> + Send + 'a>;

// == Store Trait ==
/// Ordered byte-keyed store.
///
/// Ranges are half-open `[start, end)`; a `None` bound is unbounded on that side.
pub trait Store: Send + Sync {
    /// Returns the value for `key`, or `None` if absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Ascending iteration over `[start, end)`.
    fn iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<KvIterator<'_>>;

    /// Descending iteration over `[start, end)`.
    fn reverse_iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>)
        -> Result<KvIterator<'_>>;

    fn as_flusher(&self) -> Option<&dyn Flusher> {
        None
    }

    fn as_write_througher(&self) -> Option<&dyn WriteThrougher> {
        None
    }

    fn as_clear_througher(&self) -> Option<&dyn ClearThrougher> {
        None
    }

    fn as_printer(&self) -> Option<&dyn Printer> {
        None
    }
}

// == Optional Capabilities ==
/// Pushes buffered writes all the way down to a durable sink.
pub trait Flusher {
    fn flush(&self) -> Result<()>;
}

/// Pushes buffered writes down a fixed number of layers.
pub trait WriteThrougher {
    /// # Panics
    /// If `levels` is zero, or exceeds the depth of the write-through chain.
    fn write_through(&self, levels: usize) -> Result<()>;
}

/// Drops clean read-through entries at this layer and every layer below.
pub trait ClearThrougher {
    fn clear_through(&self);
}

/// Diagnostic dump of a layer and its parents.
pub trait Printer {
    fn print(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

// == Cache Wrapping ==
/// Builds a new cache layer on top of a shared store.
pub trait CacheWrap {
    fn cache_wrap(self: Arc<Self>) -> CacheStore;
}

impl<S: Store + 'static> CacheWrap for S {
    fn cache_wrap(self: Arc<Self>) -> CacheStore {
        CacheStore::new(self)
    }
}

// == Validation ==
/// Rejects keys every store in a stack would refuse.
pub fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(StoreError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Rejects values every store in a stack would refuse.
pub fn validate_value(value: &[u8]) -> Result<()> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(StoreError::InvalidValue(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    Ok(())
}

// == Domain Helpers ==
/// Whether `key` falls within `[start, end)`.
pub fn is_key_in_domain(key: &[u8], start: Option<&[u8]>, end: Option<&[u8]>) -> bool {
    if let Some(start) = start {
        if key < start {
            return false;
        }
    }
    match end {
        Some(end) => key < end,
        None => true,
    }
}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty or all-`0xFF` prefix),
/// meaning the range is unbounded above.
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Lossy, length-capped rendering of bytes for diagnostics.
pub(crate) fn display_bytes(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(max)]).into_owned();
    if bytes.len() > max {
        format!("{}...", text)
    } else {
        text
    }
}
