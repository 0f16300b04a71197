//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Read-cache clear: Drops clean cache entries once they exceed a threshold

mod clear;

pub use clear::spawn_clear_task;
