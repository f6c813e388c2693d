//! Scan driver: walks the source keyspace and fans pages out to batch workers.
//!
//! The driver is the only sequential loop. Each non-empty page becomes one
//! spawned [`BatchWorker`] task; the [`CompletionTracker`] joins them once the
//! cursor comes back as `0`. By default the fan-out is unbounded. With
//! `max_workers` set, the driver holds a semaphore permit per running worker
//! and stops scanning while all permits are taken.

mod types;

pub use types::{ScanStats, ScanSummary};

use crate::compare::Comparator;
use crate::config::ScanConfig;
use crate::error::{CompareError, Result};
use crate::report::{Reporter, StdoutReporter};
use crate::store::KeyStore;
use crate::tracker::CompletionTracker;
use crate::worker::BatchWorker;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Engine for one full scan-and-compare pass.
pub struct ScanEngine {
    source: Arc<dyn KeyStore>,
    target: Arc<dyn KeyStore>,
    config: ScanConfig,
    reporter: Arc<dyn Reporter>,
}

impl ScanEngine {
    pub fn new(source: Arc<dyn KeyStore>, target: Arc<dyn KeyStore>, config: ScanConfig) -> Self {
        Self {
            source,
            target,
            config,
            reporter: Arc::new(StdoutReporter),
        }
    }

    /// Send diagnostic lines somewhere other than stdout.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Scan the whole source keyspace and compare every key.
    ///
    /// Returns once every launched worker has finished. A failed SCAN aborts
    /// immediately with [`CompareError::Scan`] without waiting for workers
    /// already in flight.
    pub async fn run(&self) -> Result<ScanSummary> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        info!(
            "Starting scan run {} ({} -> {}, COUNT {}, workers: {})",
            run_id,
            self.source.name(),
            self.target.name(),
            self.config.scan_count,
            self.config
                .max_workers
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        );

        let tracker = CompletionTracker::new();
        let stats = Arc::new(ScanStats::default());
        let comparator = Arc::new(Comparator::new(
            self.source.clone(),
            self.target.clone(),
            self.config.range_mode,
        ));
        let worker = Arc::new(BatchWorker::new(
            comparator,
            self.reporter.clone(),
            stats.clone(),
        ));
        let limiter = self.config.max_workers.map(|n| Arc::new(Semaphore::new(n)));

        let mut cursor = 0u64;
        let mut page_no = 0usize;

        loop {
            let page = match self.source.scan(cursor, self.config.scan_count).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Scan failed at cursor {}: {}", cursor, e);
                    return Err(CompareError::scan(cursor, e.to_string()));
                }
            };
            stats.page_scanned();
            let last = page.is_last();
            let next = page.cursor;

            if !page.keys.is_empty() {
                page_no += 1;

                let permit = match &limiter {
                    Some(semaphore) => Some(
                        semaphore
                            .clone()
                            .acquire_owned()
                            .await
                            .map_err(|_| CompareError::scan(cursor, "worker pool closed"))?,
                    ),
                    None => None,
                };

                debug!(
                    "Launching worker for page {} ({} keys, {} outstanding)",
                    page_no,
                    page.keys.len(),
                    tracker.outstanding()
                );
                let guard = tracker.announce();
                stats.batch_launched();

                let worker = worker.clone();
                let page_id = page_no;
                let keys = page.keys;
                tokio::spawn(async move {
                    worker.run(page_id, keys, guard).await;
                    drop(permit);
                });
            }

            if last {
                break;
            }
            cursor = next;
        }

        info!(
            "Keyspace scan finished: {} pages dispatched, waiting for workers",
            page_no
        );
        tracker.wait().await;

        let summary = ScanSummary::from_stats(run_id, started_at, &stats);
        info!(
            "Scan run {} complete: {} keys checked, {} mismatched, {} errors",
            summary.run_id, summary.keys_checked, summary.mismatches, summary.errors
        );
        Ok(summary)
    }
}
