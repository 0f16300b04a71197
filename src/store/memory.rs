//! In-memory base store backed by an ordered map.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::store::{validate_key, validate_value, KvIterator, KvPair, Store};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

// == Mem Store ==
/// Thread-safe ordered map, the root of a cache stack.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    map: Arc<RwLock<Map>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    fn range_iter(&self, start: Option<&[u8]>, end: Option<&[u8]>, ascending: bool) -> MemIter {
        MemIter {
            map: Arc::clone(&self.map),
            lower: start.map_or(Bound::Unbounded, |s| Bound::Included(s.to_vec())),
            upper: end.map_or(Bound::Unbounded, |e| Bound::Excluded(e.to_vec())),
            ascending,
        }
    }
}

impl Store for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.map.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;
        self.map.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.map.write().remove(key);
        Ok(())
    }

    fn iterator(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> Result<KvIterator<'_>> {
        Ok(Box::new(self.range_iter(start, end, true)))
    }

    fn reverse_iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<KvIterator<'_>> {
        Ok(Box::new(self.range_iter(start, end, false)))
    }
}

// == Mem Iterator ==
/// Cursor over a key range.
///
/// Each step re-seeks just past the last yielded key, so the read lock is
/// only held for one lookup at a time and nothing is copied up front.
struct MemIter {
    map: Arc<RwLock<Map>>,
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    ascending: bool,
}

impl Iterator for MemIter {
    type Item = Result<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if range_is_empty(&self.lower, &self.upper) {
            return None;
        }
        let (key, value) = {
            let map = self.map.read();
            let mut range = map.range::<[u8], _>((as_slice(&self.lower), as_slice(&self.upper)));
            let (key, value) = if self.ascending {
                range.next()?
            } else {
                range.next_back()?
            };
            (key.clone(), value.clone())
        };
        if self.ascending {
            self.lower = Bound::Excluded(key.clone());
        } else {
            self.upper = Bound::Excluded(key.clone());
        }
        Some(Ok((key, value)))
    }
}

fn as_slice(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

// BTreeMap::range panics on inverted or doubly-excluded equal bounds.
fn range_is_empty(lower: &Bound<Vec<u8>>, upper: &Bound<Vec<u8>>) -> bool {
    match (lower, upper) {
        (Bound::Included(l), Bound::Excluded(u)) | (Bound::Excluded(l), Bound::Excluded(u)) => {
            l >= u
        }
        (Bound::Excluded(l), Bound::Included(u)) => l >= u,
        (Bound::Included(l), Bound::Included(u)) => l > u,
        _ => false,
    }
}
