//! Sorted Dirty Cache Module
//!
//! Incrementally maintained, key-ordered view of a layer's pending writes,
//! used as the cache side of range iteration.

use std::cmp::Ordering;

use crate::store::is_key_in_domain;

// == Dirty Item ==
/// A pending write as seen by iteration. `value == None` is a delete marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtyItem {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

impl DirtyItem {
    pub fn is_deleted(&self) -> bool {
        self.value.is_none()
    }
}

// == Sorted Cache ==
/// Strictly ascending, duplicate-free sequence of reconciled dirty items.
#[derive(Debug, Default)]
pub struct SortedCache {
    items: Vec<DirtyItem>,
}

impl SortedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    // == Merge Batch ==
    /// Folds a batch of freshly reconciled items into the sequence.
    ///
    /// Two-pointer merge: for each batch item, existing items with smaller
    /// keys are kept in place, an equal key is overwritten, otherwise the
    /// item is inserted before the cursor. Leftover batch items are appended.
    pub fn merge_batch(&mut self, mut batch: Vec<DirtyItem>) {
        if batch.is_empty() {
            return;
        }
        batch.sort_by(|a, b| a.key.cmp(&b.key));

        let existing = std::mem::take(&mut self.items);
        let mut merged = Vec::with_capacity(existing.len() + batch.len());
        let mut cursor = existing.into_iter().peekable();

        for item in batch {
            while let Some(current) = cursor.peek() {
                match current.key.cmp(&item.key) {
                    Ordering::Less => merged.extend(cursor.next()),
                    Ordering::Equal => {
                        cursor.next();
                        break;
                    }
                    Ordering::Greater => break,
                }
            }
            merged.push(item);
        }
        merged.extend(cursor);

        self.items = merged;
    }

    // == Range Snapshot ==
    /// Copies the items within `[start, end)` in ascending order.
    pub fn range(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Vec<DirtyItem> {
        let lo = match start {
            Some(start) => self.items.partition_point(|item| item.key.as_slice() < start),
            None => 0,
        };
        let hi = match end {
            Some(end) => self.items.partition_point(|item| item.key.as_slice() < end),
            None => self.items.len(),
        };
        if lo >= hi {
            return Vec::new();
        }
        debug_assert!(self.items[lo..hi]
            .iter()
            .all(|item| is_key_in_domain(&item.key, start, end)));
        self.items[lo..hi].to_vec()
    }

    #[cfg(test)]
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.items.iter().map(|item| item.key.clone()).collect()
    }
}
