//! Cache Module
//!
//! Write-back cache layers that stack over any ordered store.

mod entry;
mod iterator;
mod merge;
mod sorted;
mod stats;
mod store;


// Re-export public types
pub use entry::CachedValue;
pub use iterator::CacheRangeIter;
pub use merge::MergeIterator;
pub use sorted::DirtyItem;
pub use stats::CacheStats;
pub use store::CacheStore;
