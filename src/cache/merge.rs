//! Merge Iterator Module
//!
//! Lazily combines a parent store's range iterator with a cache layer's
//! pending writes into one ordered, duplicate-free, tombstone-free sequence.

use std::cmp::Ordering;
use std::iter::Peekable;

use crate::cache::iterator::CacheRangeIter;
use crate::error::Result;
use crate::store::{KvIterator, KvPair};

/// Which side the next step draws from.
enum Step {
    Parent,
    Cache,
    Both,
}

// == Merge Iterator ==
/// Two-way merge by key where the cache side shadows the parent.
///
/// Errors from the parent are yielded as they are reached.
pub struct MergeIterator<'a> {
    parent: Peekable<KvIterator<'a>>,
    cache: Peekable<CacheRangeIter>,
    ascending: bool,
}

impl<'a> MergeIterator<'a> {
    pub fn new(parent: KvIterator<'a>, cache: CacheRangeIter, ascending: bool) -> Self {
        Self {
            parent: parent.peekable(),
            cache: cache.peekable(),
            ascending,
        }
    }

    /// Orders a parent key against a cache key in iteration direction.
    fn compare(ascending: bool, parent: &[u8], cache: &[u8]) -> Ordering {
        let order = parent.cmp(cache);
        if ascending {
            order
        } else {
            order.reverse()
        }
    }
}

impl Iterator for MergeIterator<'_> {
    type Item = Result<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ascending = self.ascending;
            let step = match (self.parent.peek(), self.cache.peek()) {
                (_, None) => return self.parent.next(),
                (None, Some(_)) => Step::Cache,
                (Some(Err(_)), Some(_)) => return self.parent.next(),
                (Some(Ok((parent_key, _))), Some(cached)) => {
                    match Self::compare(ascending, parent_key, &cached.key) {
                        Ordering::Less => Step::Parent,
                        Ordering::Greater => Step::Cache,
                        Ordering::Equal => Step::Both,
                    }
                }
            };

            match step {
                Step::Parent => return self.parent.next(),
                Step::Cache => {}
                Step::Both => {
                    // Shadowed by the cache entry.
                    self.parent.next();
                }
            }

            let cached = self.cache.next()?;
            if let Some(value) = cached.value {
                return Some(Ok((cached.key, value)));
            }
            // Tombstone: skip without emitting.
        }
    }
}
