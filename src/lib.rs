//! cachekv - Write-back caching layers over an ordered key-value store
//!
//! Stacks transient, rollback-able views over a base store. Each layer
//! buffers reads and writes, tracks deletes as tombstones and iterates
//! ranges by lazily merging its pending writes with its parent.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheStore;
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{
    CacheWrap, ClearThrougher, Flusher, KvIterator, KvPair, MemStore, Printer, Store,
    WriteThrougher,
};
pub use tasks::spawn_clear_task;
