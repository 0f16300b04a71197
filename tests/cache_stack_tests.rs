//! Integration Tests for Cache Stacks
//!
//! Exercises layers composed over each other and over custom parents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cachekv::{
    CacheStore, CacheWrap, ClearThrougher, Flusher, KvIterator, MemStore, Printer, Result, Store,
    StoreError, WriteThrougher,
};

// == Helper Stores ==

/// Parent that fails every `set` after the first `allowed` ones.
struct FailingStore {
    inner: MemStore,
    allowed: usize,
    sets: AtomicUsize,
}

impl FailingStore {
    fn new(allowed: usize) -> Self {
        Self {
            inner: MemStore::new(),
            allowed,
            sets: AtomicUsize::new(0),
        }
    }
}

impl Store for FailingStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.sets.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(StoreError::backend("disk full"));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(key)
    }

    fn iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<KvIterator<'_>> {
        self.inner.iterator(start, end)
    }

    fn reverse_iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<KvIterator<'_>> {
        self.inner.reverse_iterator(start, end)
    }
}

/// Parent that records reads, flushes and clears, standing in for a durable sink.
#[derive(Default)]
struct SinkStore {
    inner: MemStore,
    gets: AtomicUsize,
    flushes: AtomicUsize,
    clears: AtomicUsize,
}

impl Store for SinkStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(key)
    }

    fn iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<KvIterator<'_>> {
        self.inner.iterator(start, end)
    }

    fn reverse_iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<KvIterator<'_>> {
        self.inner.reverse_iterator(start, end)
    }

    fn as_flusher(&self) -> Option<&dyn Flusher> {
        Some(self)
    }

    fn as_clear_througher(&self) -> Option<&dyn ClearThrougher> {
        Some(self)
    }
}

impl Flusher for SinkStore {
    fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl ClearThrougher for SinkStore {
    fn clear_through(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

// == Stack Helpers ==

/// Base store plus layers, bottom first.
fn stack(depth: usize) -> (Arc<MemStore>, Vec<Arc<CacheStore>>) {
    let base = Arc::new(MemStore::new());
    let mut layers: Vec<Arc<CacheStore>> = Vec::with_capacity(depth);
    let mut parent: Arc<dyn Store> = base.clone();
    for _ in 0..depth {
        let layer = Arc::new(CacheStore::new(parent));
        parent = layer.clone();
        layers.push(layer);
    }
    (base, layers)
}

fn pairs(iter: KvIterator<'_>) -> Vec<(String, String)> {
    iter.map(|item| {
        let (k, v) = item.unwrap();
        (String::from_utf8(k).unwrap(), String::from_utf8(v).unwrap())
    })
    .collect()
}

fn kv(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// == Composition Tests ==

#[test]
fn test_cache_wrap_builds_chain() {
    let base = Arc::new(MemStore::new());
    base.set(b"k", b"base").unwrap();

    let first = Arc::new(base.clone().cache_wrap());
    let second = first.clone().cache_wrap();

    assert_eq!(second.get(b"k").unwrap(), Some(b"base".to_vec()));
    second.set(b"k", b"second").unwrap();
    assert_eq!(first.get(b"k").unwrap(), Some(b"base".to_vec()));
    assert_eq!(second.get(b"k").unwrap(), Some(b"second".to_vec()));
}

#[test]
fn test_nested_iteration_merges_every_layer() {
    let (base, layers) = stack(3);
    base.set(b"a", b"base").unwrap();
    base.set(b"d", b"base").unwrap();

    layers[0].set(b"b", b"l0").unwrap();
    layers[0].delete(b"a").unwrap();
    layers[1].set(b"c", b"l1").unwrap();
    layers[1].set(b"a", b"l1").unwrap();
    layers[2].delete(b"d").unwrap();
    layers[2].set(b"b", b"l2").unwrap();

    let top = &layers[2];
    assert_eq!(
        pairs(top.iterator(None, None).unwrap()),
        kv(&[("a", "l1"), ("b", "l2"), ("c", "l1")])
    );
    assert_eq!(
        pairs(top.reverse_iterator(Some(b"b"), None).unwrap()),
        kv(&[("c", "l1"), ("b", "l2")])
    );

    // Lower layers are unaffected by the top's pending writes.
    assert_eq!(
        pairs(layers[0].iterator(None, None).unwrap()),
        kv(&[("b", "l0"), ("d", "base")])
    );
}

#[test]
fn test_reads_reach_the_sink_once_per_key() {
    let sink = Arc::new(SinkStore::default());
    sink.inner.set(b"present", b"v").unwrap();
    let lower = Arc::new(CacheStore::new(sink.clone()));
    let upper = CacheStore::new(lower.clone());

    for _ in 0..3 {
        assert_eq!(upper.get(b"present").unwrap(), Some(b"v".to_vec()));
        assert_eq!(upper.get(b"absent").unwrap(), None);
        assert!(upper.has(b"present").unwrap());
    }
    assert_eq!(sink.gets.load(Ordering::SeqCst), 2);

    // A fresh layer over the same lower layer is served by it.
    let sibling = CacheStore::new(lower.clone());
    assert_eq!(sibling.get(b"present").unwrap(), Some(b"v".to_vec()));
    assert_eq!(sink.gets.load(Ordering::SeqCst), 2);
    assert_eq!(lower.stats().hits, 1);
}

// == Write-back Tests ==

#[test]
fn test_write_through_stops_after_requested_levels() {
    let (base, layers) = stack(3);
    layers[0].set(b"bottom", b"0").unwrap();
    layers[2].set(b"top", b"2").unwrap();

    layers[2].write_through(2).unwrap();

    assert!(layers[2].is_empty());
    assert_eq!(layers[1].pending_writes(), 0);
    // The bottom layer now holds both writes, and the base none.
    assert_eq!(layers[0].pending_writes(), 2);
    assert!(base.is_empty());

    layers[0].write_through(1).unwrap();
    assert_eq!(base.len(), 2);
}

#[test]
fn test_flush_reaches_durable_sink() {
    let sink = Arc::new(SinkStore::default());
    let lower = Arc::new(CacheStore::new(sink.clone()));
    let upper = CacheStore::new(lower.clone());

    upper.set(b"k", b"v").unwrap();
    upper.delete(b"gone").unwrap();
    upper.flush().unwrap();

    assert_eq!(sink.inner.get(b"k").unwrap(), Some(b"v".to_vec()));
    assert_eq!(sink.flushes.load(Ordering::SeqCst), 1);
    assert!(upper.is_empty());
    assert!(lower.is_empty());
}

#[test]
fn test_clear_through_reaches_every_layer() {
    let sink = Arc::new(SinkStore::default());
    sink.inner.set(b"r", b"1").unwrap();
    let lower = Arc::new(CacheStore::new(sink.clone()));
    let upper = CacheStore::new(lower.clone());

    upper.get(b"r").unwrap();
    upper.set(b"w", b"2").unwrap();
    assert_eq!(lower.len(), 1);

    upper.clear_through();
    assert_eq!(upper.len(), 1);
    assert_eq!(lower.len(), 0);
    assert_eq!(sink.clears.load(Ordering::SeqCst), 1);

    upper.clear_through();
    assert_eq!(upper.len(), 1);
    assert_eq!(upper.get(b"w").unwrap(), Some(b"2".to_vec()));
}

#[test]
fn test_write_is_not_atomic_on_parent_failure() {
    let parent = Arc::new(FailingStore::new(1));
    let cache = CacheStore::new(parent.clone());
    cache.set(b"a", b"1").unwrap();
    cache.set(b"b", b"2").unwrap();
    cache.set(b"c", b"3").unwrap();

    let result = cache.write();
    assert!(matches!(result, Err(StoreError::Backend(_))));

    // First key in order landed, the rest were dropped with the layer.
    assert_eq!(parent.inner.get(b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(parent.inner.get(b"b").unwrap(), None);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().writes_flushed, 1);
}

#[test]
fn test_parent_read_errors_propagate_without_caching() {
    struct BrokenStore;

    impl Store for BrokenStore {
        fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>> {
            Err(StoreError::backend("unreachable"))
        }
        fn set(&self, _key: &[u8], _value: &[u8]) -> Result<()> {
            Err(StoreError::backend("unreachable"))
        }
        fn delete(&self, _key: &[u8]) -> Result<()> {
            Err(StoreError::backend("unreachable"))
        }
        fn iterator(&self, _start: Option<&[u8]>, _end: Option<&[u8]>) -> Result<KvIterator<'_>> {
            Err(StoreError::backend("unreachable"))
        }
        fn reverse_iterator(
            &self,
            _start: Option<&[u8]>,
            _end: Option<&[u8]>,
        ) -> Result<KvIterator<'_>> {
            Err(StoreError::backend("unreachable"))
        }
    }

    let cache = CacheStore::new(Arc::new(BrokenStore));
    assert!(matches!(cache.get(b"k"), Err(StoreError::Backend(_))));
    assert!(cache.is_empty());
    assert!(cache.iterator(None, None).is_err());

    // Writes stay buffered and readable without touching the parent.
    cache.set(b"k", b"v").unwrap();
    assert_eq!(cache.get(b"k").unwrap(), Some(b"v".to_vec()));
    assert!(cache.write().is_err());
}

// == Diagnostics Tests ==

#[test]
fn test_print_walks_the_chain() {
    let (base, layers) = stack(2);
    base.set(b"at-base", b"b").unwrap();
    layers[0].set(b"at-bottom", b"0").unwrap();
    layers[1].set(b"at-top", b"1").unwrap();

    let mut out = String::new();
    layers[1].print(&mut out).unwrap();

    let top = out.find("at-top").unwrap();
    let bottom = out.find("at-bottom").unwrap();
    let base_pos = out.find("at-base").unwrap();
    assert!(top < bottom && bottom < base_pos, "Layers should print top to bottom");
}
