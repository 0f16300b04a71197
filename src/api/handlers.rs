//! API Handlers
//!
//! HTTP request handlers for each store server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::CacheStore;
use crate::error::{Result, StoreError};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, RangeQuery, RangeResponse,
    SetRequest, SetResponse, StatsResponse, WriteResponse,
};
use crate::store::{ClearThrougher, Flusher, MemStore, Printer, Store, WriteThrougher};

/// Application state shared across all handlers.
///
/// `cache` is the top of a stack of `depth` cache layers over `base`.
/// Each layer locks itself, so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    /// Base store at the bottom of the stack
    pub base: Arc<MemStore>,
    /// Top cache layer
    pub cache: Arc<CacheStore>,
    /// Number of cache layers
    pub depth: usize,
}

impl AppState {
    /// Creates a new AppState stacking `depth` cache layers (at least one)
    /// over `base`.
    pub fn new(base: Arc<MemStore>, depth: usize) -> Self {
        let depth = depth.max(1);
        let mut top: Arc<dyn Store> = base.clone();
        for _ in 1..depth {
            top = Arc::new(CacheStore::new(top));
        }
        Self {
            base,
            cache: Arc::new(CacheStore::new(top)),
            depth,
        }
    }

    /// Creates a new AppState from configuration over an empty base store.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(Arc::new(MemStore::new()), config.cache_depth)
    }
}

/// Handler for PUT /set
///
/// Buffers a write in the top cache layer.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(StoreError::InvalidRequest(error_msg));
    }

    state.cache.set(req.key.as_bytes(), req.value.as_bytes())?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Reads a key through the stack.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(key.as_bytes())? {
        Some(value) => {
            let value = String::from_utf8_lossy(&value).into_owned();
            Ok(Json(GetResponse::new(key, value)))
        }
        None => Err(StoreError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Buffers a delete in the top cache layer.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(key.as_bytes())?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /range
///
/// Iterates the merged view of the whole stack.
pub async fn range_handler(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RangeResponse>> {
    let (start, end) = query.bounds();
    let iter = if query.reverse {
        state.cache.reverse_iterator(start.as_deref(), end.as_deref())?
    } else {
        state.cache.iterator(start.as_deref(), end.as_deref())?
    };

    let pairs = iter
        .take(query.limit.unwrap_or(usize::MAX))
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(RangeResponse::new(pairs)))
}

/// Handler for POST /write
///
/// Writes the top layer's pending writes into the layer below.
pub async fn write_handler(State(state): State<AppState>) -> Result<Json<WriteResponse>> {
    let pending = state.cache.pending_writes();
    state.cache.write()?;

    Ok(Json(WriteResponse::new("Write", pending)))
}

/// Handler for POST /flush
///
/// Writes pending writes through every layer down to the base store.
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<WriteResponse>> {
    let pending = state.cache.pending_writes();
    state.cache.flush()?;

    Ok(Json(WriteResponse::new("Flush", pending)))
}

/// Handler for POST /write-through/:levels
///
/// Writes pending writes down `levels` layers. Rejects depths the stack
/// does not have instead of tripping the layer's precondition.
pub async fn write_through_handler(
    State(state): State<AppState>,
    Path(levels): Path<usize>,
) -> Result<Json<WriteResponse>> {
    if levels < 1 || levels > state.depth {
        return Err(StoreError::InvalidRequest(format!(
            "levels must be between 1 and {}",
            state.depth
        )));
    }

    let pending = state.cache.pending_writes();
    state.cache.write_through(levels)?;

    Ok(Json(WriteResponse::new("Write-through", pending)))
}

/// Handler for POST /clear
///
/// Drops clean read-through entries from every layer.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear_through();

    Json(ClearResponse::new(state.cache.len()))
}

/// Handler for GET /stats
///
/// Returns statistics of the top layer.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.cache.stats(),
        state.depth,
        state.base.len(),
    ))
}

/// Handler for GET /dump
///
/// Returns a plain-text dump of every layer and the base store.
pub async fn dump_handler(State(state): State<AppState>) -> Result<String> {
    let mut out = String::new();
    state
        .cache
        .print(&mut out)
        .map_err(|_| StoreError::backend("failed to render dump"))?;
    Ok(out)
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
