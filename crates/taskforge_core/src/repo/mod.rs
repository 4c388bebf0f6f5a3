//! Repository layer: tracker persistence contract and backends.
//!
//! # Responsibility
//! - Define the load/save capability every storage backend implements.
//! - Isolate file and SQL details from the tracker service and CLI.
//!
//! # Invariants
//! - `load()` on a backend with no prior state yields an empty tracker.
//! - `save()` followed by `load()` reproduces ids, titles, done flags and order.

pub mod json_repo;
pub mod memory_repo;
pub mod sqlite_repo;
pub mod tracker_repo;
