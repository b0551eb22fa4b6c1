//! # Bionet IO
//!
//! Persistence layer for Bionet snapshots.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - JSON serialization helpers
//! - Snapshot files, optionally gzip-compressed

/// Error types and result aliases for I/O operations
pub mod error;
/// Snapshot save/load with optional gzip
pub mod persistence;
/// Validated JSON serialization helpers
pub mod serialization;

pub use error::{IoError, Result};
pub use persistence::{load_snapshot, save_snapshot};
pub use serialization::{from_json, to_json, to_json_pretty};
