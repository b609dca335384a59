//! Ingestion for the planning engine.
//!
//! Reads the CSV inputs once at startup and hands back a [`DataSnapshot`]
//! that callers share read-only for the life of the process.

pub mod error;
pub mod loader;
pub mod snapshot;

pub use error::{DataError, DataResult};
pub use loader::{FileTally, SegmentTally};
pub use snapshot::{load_snapshot, DataSnapshot, LoadReport};
