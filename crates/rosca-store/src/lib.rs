//! Persistence for the committee ledger.
//!
//! The ledger engine owns state; this crate only loads it once at startup
//! and writes it back after each change through the engine's
//! [`SnapshotSink`](rosca_ledger::SnapshotSink) seam.
//!
//! # Modules
//!
//! - [`error`]: Error types for store operations
//! - [`file`]: [`JsonFileStore`], a single JSON record on disk
//! - [`memory`]: [`MemorySink`], an in-memory sink for tests

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemorySink;
