//! Domain model for tracked tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Titles are validated on every write path.

pub mod task;
