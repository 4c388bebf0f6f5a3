//! Core use-case services.
//!
//! # Responsibility
//! - Hold in-memory task state and the operations commands run against it.
//! - Keep CLI and storage layers decoupled from each other.

pub mod tracker;
