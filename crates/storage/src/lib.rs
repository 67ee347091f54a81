//! PostgreSQL persistence for ocean-monitor.
//!
//! Provides the write side of the ingestion pipeline (batched upserts,
//! run log, retention sweep) and the read-side query functions the
//! dashboard layer consumes.

pub mod queries;
pub mod store;

pub use queries::{PipelineStatus, StationWithLatest};
pub use store::Store;
