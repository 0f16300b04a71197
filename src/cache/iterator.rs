//! Cache Range Iterator Module
//!
//! Iteration over the pending writes of a single cache layer.

use std::vec;

use crate::cache::sorted::DirtyItem;

// == Cache Range Iterator ==
/// Snapshot of a layer's reconciled dirty items within a range.
///
/// Delete markers are yielded as items with `value == None`; filtering them
/// out is the merge iterator's job.
#[derive(Debug)]
pub struct CacheRangeIter {
    items: vec::IntoIter<DirtyItem>,
    ascending: bool,
}

impl CacheRangeIter {
    /// `items` must be in ascending key order.
    pub fn new(items: Vec<DirtyItem>, ascending: bool) -> Self {
        Self {
            items: items.into_iter(),
            ascending,
        }
    }
}

impl Iterator for CacheRangeIter {
    type Item = DirtyItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ascending {
            self.items.next()
        } else {
            self.items.next_back()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}
