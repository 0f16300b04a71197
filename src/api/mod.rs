//! API Module
//!
//! HTTP handlers and routing for the store server REST API.
//!
//! # Endpoints
//! - `PUT /set`, `GET /get/:key`, `DELETE /del/:key` - Point operations
//! - `GET /range` - Merged range iteration
//! - `POST /write`, `POST /write-through/:levels`, `POST /flush` - Write-back
//! - `POST /clear` - Drop clean read-through entries
//! - `GET /stats`, `GET /dump`, `GET /health` - Diagnostics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
