//! Batch worker pool streaming profiles back as they complete.

pub mod pool;

pub use pool::{BatchPool, BatchPoolConfig, BatchSummary};
