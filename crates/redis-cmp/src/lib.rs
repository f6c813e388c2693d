//! # redis-cmp
//!
//! Verifies that two Redis instances (a source and its replica or migration
//! target) hold identical data.
//!
//! The source keyspace is walked with `SCAN`; every page of keys is handed to
//! a concurrent batch worker, which reads each key from both stores with the
//! command that fits its type and reports any key whose value differs:
//!
//! - **Type-dispatched comparison** for strings, hashes, sets, sorted sets and lists
//! - **Concurrent fan-out**, one worker per page, optionally capped
//! - **Completion tracking** so the run only ends once every page is compared
//! - **Read errors kept apart** from value mismatches
//!
//! ## Example
//!
//! ```rust,no_run
//! use redis_cmp::{CompareConfig, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> redis_cmp::Result<()> {
//!     let config = CompareConfig::new("redis://localhost:6379/0", "redis://replica:6379/0");
//!     let orchestrator = Orchestrator::new(config).await?;
//!     let summary = orchestrator.run().await?;
//!     println!("{} keys checked, {} differ", summary.keys_checked, summary.mismatches);
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod keyspace;
pub mod orchestrator;
pub mod report;
pub mod scan;
pub mod store;
pub mod tracker;
pub mod worker;

// Re-exports for convenient access
pub use compare::{Comparator, ComparisonResult, Verdict};
pub use config::{CompareConfig, RangeMode, ScanConfig, StoreConfig};
pub use error::{CompareError, Result};
pub use keyspace::{KeyCountCheck, KeyspaceStats, COUNT_MISMATCH_LINE};
pub use orchestrator::Orchestrator;
pub use report::{Reporter, StdoutReporter};
pub use scan::{ScanEngine, ScanSummary};
pub use store::{KeyStore, KeyType, MemoryStore, Page, RedisStore, Side};
pub use tracker::{CompletionGuard, CompletionTracker};
pub use worker::{BatchReport, BatchWorker};
