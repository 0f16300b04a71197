//! Cache Store Module
//!
//! Write-back cache layer over any [`Store`]. Reads are cached, writes and
//! deletes are buffered until [`CacheStore::write`], and range iteration
//! merges buffered writes with the parent's contents.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::iterator::CacheRangeIter;
use crate::cache::merge::MergeIterator;
use crate::cache::sorted::{DirtyItem, SortedCache};
use crate::cache::{CacheStats, CachedValue};
use crate::error::Result;
use crate::store::{
    display_bytes, is_key_in_domain, validate_key, validate_value, ClearThrougher, Flusher,
    KvIterator, Printer, Store, WriteThrougher, MAX_KEY_LENGTH,
};

/// Values longer than this are truncated by [`Printer::print`].
const PRINT_VALUE_LIMIT: usize = 550;

// == Cache State ==
/// Everything guarded by a layer's lock.
#[derive(Debug, Default)]
struct CacheState {
    /// Cached entries, clean and dirty
    cache: HashMap<Vec<u8>, CachedValue>,
    /// Dirty keys not yet folded into `sorted`
    unsorted: HashSet<Vec<u8>>,
    /// Reconciled dirty items, ascending by key
    sorted: SortedCache,
    stats: CacheStats,
}

impl CacheState {
    /// Only entry point that mutates `cache` and `unsorted`.
    fn set_cache_value(&mut self, key: &[u8], value: CachedValue) {
        if value.dirty {
            self.unsorted.insert(key.to_vec());
        }
        self.cache.insert(key.to_vec(), value);
    }

    /// Moves every dirty key within `[start, end)` from `unsorted` into `sorted`.
    fn dirty_items(&mut self, start: Option<&[u8]>, end: Option<&[u8]>) {
        let cache = &self.cache;
        let mut batch = Vec::new();
        self.unsorted.retain(|key| {
            if !is_key_in_domain(key, start, end) {
                return true;
            }
            batch.push(DirtyItem {
                key: key.clone(),
                value: cache.get(key).and_then(|entry| entry.value.clone()),
            });
            false
        });
        self.sorted.merge_batch(batch);
    }

    /// Drops clean entries, returning how many were removed.
    fn clear_clean(&mut self) -> usize {
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.dirty);
        before - self.cache.len()
    }

    /// Empties the layer, handing back the cached entries.
    fn take_entries(&mut self) -> HashMap<Vec<u8>, CachedValue> {
        self.unsorted.clear();
        self.sorted.clear();
        std::mem::take(&mut self.cache)
    }

    fn pending_writes(&self) -> usize {
        self.cache.values().filter(|entry| entry.dirty).count()
    }
}

// == Cache Store ==
/// One layer of a cache stack.
///
/// A single lock guards the layer's state. Calls into the parent are made
/// while holding it, which is safe as long as the stack is a simple chain.
pub struct CacheStore {
    state: Mutex<CacheState>,
    parent: Arc<dyn Store>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty layer over `parent`.
    pub fn new(parent: Arc<dyn Store>) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            parent,
        }
    }

    /// Returns the store this layer writes back into.
    pub fn parent(&self) -> &Arc<dyn Store> {
        &self.parent
    }

    // == Write ==
    /// Replays pending writes into the parent in ascending key order, then
    /// empties the layer.
    ///
    /// Not atomic: the layer is emptied before the replay starts, so a parent
    /// failure part-way through leaves the parent partially updated and the
    /// remaining writes discarded. The failure is returned.
    pub fn write(&self) -> Result<()> {
        let mut state = self.state.lock();

        let mut dirty: Vec<(Vec<u8>, CachedValue)> = state
            .take_entries()
            .into_iter()
            .filter(|(_, entry)| entry.dirty)
            .collect();
        dirty.sort_by(|a, b| a.0.cmp(&b.0));

        let mut flushed = 0;
        let result: Result<()> = dirty.iter().try_for_each(|(key, entry)| {
            if entry.deleted {
                self.parent.delete(key)?;
            } else if let Some(value) = &entry.value {
                self.parent.set(key, value)?;
            } else {
                // Absent without a tombstone: nothing to write back.
                return Ok(());
            }
            flushed += 1;
            Ok(())
        });

        state.stats.record_flushed(flushed);
        debug!(pending = dirty.len(), flushed, ok = result.is_ok(), "cache layer written");
        result
    }

    // == Stats ==
    /// Returns current layer statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.cached_entries = state.cache.len();
        stats.pending_writes = state.pending_writes();
        stats
    }

    /// Returns the number of pending writes.
    pub fn pending_writes(&self) -> usize {
        self.state.lock().pending_writes()
    }

    // == Length ==
    /// Returns the number of cached entries, clean and dirty.
    pub fn len(&self) -> usize {
        self.state.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().cache.is_empty()
    }

    // == Iteration ==
    /// Builds a merged iterator over `[start, end)`.
    ///
    /// The cache side is snapshotted here; mutating this layer while the
    /// returned iterator is consumed is not reflected in it.
    fn merged_iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        ascending: bool,
    ) -> Result<KvIterator<'_>> {
        let mut state = self.state.lock();

        let parent = if ascending {
            self.parent.iterator(start, end)?
        } else {
            self.parent.reverse_iterator(start, end)?
        };

        state.dirty_items(start, end);
        let cache = CacheRangeIter::new(state.sorted.range(start, end), ascending);

        Ok(Box::new(MergeIterator::new(parent, cache, ascending)))
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CacheStore")
            .field("cached_entries", &state.cache.len())
            .field("unsorted", &state.unsorted.len())
            .field("sorted", &state.sorted.len())
            .finish_non_exhaustive()
    }
}

// == Store Implementation ==
impl Store for CacheStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let mut state = self.state.lock();

        let cached = state.cache.get(key).map(|entry| entry.value.clone());
        if let Some(value) = cached {
            state.stats.record_hit();
            return Ok(value);
        }

        let value = self.parent.get(key)?;
        trace!(key = %display_bytes(key, MAX_KEY_LENGTH), found = value.is_some(), "read through to parent");
        state.stats.record_miss();
        state.set_cache_value(key, CachedValue::clean(value.clone()));
        Ok(value)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;
        self.state
            .lock()
            .set_cache_value(key, CachedValue::written(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.state.lock().set_cache_value(key, CachedValue::tombstone());
        Ok(())
    }

    fn iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<KvIterator<'_>> {
        self.merged_iterator(start, end, true)
    }

    fn reverse_iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<KvIterator<'_>> {
        self.merged_iterator(start, end, false)
    }

    fn as_flusher(&self) -> Option<&dyn Flusher> {
        Some(self)
    }

    fn as_write_througher(&self) -> Option<&dyn WriteThrougher> {
        Some(self)
    }

    fn as_clear_througher(&self) -> Option<&dyn ClearThrougher> {
        Some(self)
    }

    fn as_printer(&self) -> Option<&dyn Printer> {
        Some(self)
    }
}

// == Chaining ==
impl Flusher for CacheStore {
    /// Writes this layer, then flushes the parent if it can be flushed.
    fn flush(&self) -> Result<()> {
        self.write()?;
        if let Some(parent) = self.parent.as_flusher() {
            parent.flush()?;
        }
        Ok(())
    }
}

impl WriteThrougher for CacheStore {
    fn write_through(&self, levels: usize) -> Result<()> {
        assert!(levels >= 1, "write_through requires at least one level");
        self.write()?;
        if levels >= 2 {
            match self.parent.as_write_througher() {
                Some(parent) => parent.write_through(levels - 1)?,
                None => panic!(
                    "write_through: parent cannot write through {} more level(s)",
                    levels - 1
                ),
            }
        }
        Ok(())
    }
}

impl ClearThrougher for CacheStore {
    /// Drops clean entries here and in every parent that supports it.
    /// Pending writes are kept.
    fn clear_through(&self) {
        let mut state = self.state.lock();
        let removed = state.clear_clean();
        state.stats.record_cleared(removed);
        debug!(removed, "cleared clean entries");

        if let Some(parent) = self.parent.as_clear_througher() {
            parent.clear_through();
        }
    }
}

impl Printer for CacheStore {
    fn print(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let state = self.state.lock();
        writeln!(out, "cache layer {:p}", self)?;

        let mut entries: Vec<_> = state.cache.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, entry) in entries {
            let value = match &entry.value {
                Some(value) => display_bytes(value, PRINT_VALUE_LIMIT),
                None => "<nil>".to_string(),
            };
            writeln!(
                out,
                "  {} = {} deleted={} dirty={}",
                display_bytes(key, MAX_KEY_LENGTH),
                value,
                entry.deleted,
                entry.dirty
            )?;
        }

        writeln!(out, "cache layer {:p} parent:", self)?;
        match self.parent.as_printer() {
            Some(parent) => parent.print(out)?,
            None => print_store(self.parent.as_ref(), out)?,
        }
        writeln!(out, "cache layer {:p} end", self)
    }
}

/// Dumps a store without its own printer by iterating its full range.
fn print_store(store: &dyn Store, out: &mut dyn fmt::Write) -> fmt::Result {
    let iter = match store.iterator(None, None) {
        Ok(iter) => iter,
        Err(err) => return writeln!(out, "  <iteration failed: {}>", err),
    };
    for item in iter {
        match item {
            Ok((key, value)) => writeln!(
                out,
                "  {} = {}",
                display_bytes(&key, MAX_KEY_LENGTH),
                display_bytes(&value, PRINT_VALUE_LIMIT)
            )?,
            Err(err) => writeln!(out, "  <iteration failed: {}>", err)?,
        }
    }
    Ok(())
}
