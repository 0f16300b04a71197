//! Cached Value Module
//!
//! Defines the per-key state a cache layer keeps between flushes.

// == Cached Value ==
/// State of one key in a cache layer.
///
/// | value  | deleted | meaning                                      |
/// |--------|---------|----------------------------------------------|
/// | Some   | false   | value (read from parent or written locally)  |
/// | None   | false   | parent had no value (negative read cache)    |
/// | None   | true    | tombstone: locally deleted                   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
    /// The cached value; `None` means absent in the merged view
    pub value: Option<Vec<u8>>,
    /// Tombstone marker, shadows any parent value until flush
    pub deleted: bool,
    /// Pending local write that must reach the parent on flush
    pub dirty: bool,
}

impl CachedValue {
    // == Constructors ==
    /// Result of a read through to the parent. Never written back.
    pub fn clean(value: Option<Vec<u8>>) -> Self {
        Self {
            value,
            deleted: false,
            dirty: false,
        }
    }

    /// A local write.
    pub fn written(value: Vec<u8>) -> Self {
        Self {
            value: Some(value),
            deleted: false,
            dirty: true,
        }
    }

    /// A local delete.
    pub fn tombstone() -> Self {
        Self {
            value: None,
            deleted: true,
            dirty: true,
        }
    }

    /// Returns true if this entry hides the key from the merged view.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}
