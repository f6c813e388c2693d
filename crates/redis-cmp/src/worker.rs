//! Batch worker: compares one scanned page of keys.

use crate::compare::{Comparator, Verdict};
use crate::report::Reporter;
use crate::scan::ScanStats;
use crate::store::{display_key, Bytes};
use crate::tracker::CompletionGuard;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub page: usize,
    pub keys_checked: usize,
    pub mismatched: Vec<Bytes>,
    pub errors: Vec<Bytes>,
}

/// Runs the comparator over every key of a page, in page order.
pub struct BatchWorker {
    comparator: Arc<Comparator>,
    reporter: Arc<dyn Reporter>,
    stats: Arc<ScanStats>,
}

impl BatchWorker {
    pub fn new(
        comparator: Arc<Comparator>,
        reporter: Arc<dyn Reporter>,
        stats: Arc<ScanStats>,
    ) -> Self {
        Self {
            comparator,
            reporter,
            stats,
        }
    }

    /// Compare `keys` and release `guard` when done.
    ///
    /// Each key is independent: a failed read is reported for that key and the
    /// loop moves on.
    pub async fn run(&self, page: usize, keys: Vec<Bytes>, guard: CompletionGuard) -> BatchReport {
        let mut report = BatchReport {
            page,
            ..Default::default()
        };

        for key in keys {
            let result = self.comparator.compare(&key).await;
            self.stats.record(&result);
            report.keys_checked += 1;

            match &result.verdict {
                Verdict::Match => {}
                Verdict::Mismatch => {
                    self.reporter.mismatch(&key);
                    report.mismatched.push(key);
                }
                Verdict::Error { side, message } => {
                    warn!("{}: read on {} failed: {}", display_key(&key), side, message);
                    self.reporter.retrieval_error(&key, *side, message);
                    report.errors.push(key);
                }
            }
        }

        self.reporter.page_done(page, report.keys_checked);
        debug!(
            "Page {}: {} keys, {} mismatched, {} errors",
            page,
            report.keys_checked,
            report.mismatched.len(),
            report.errors.len()
        );

        guard.complete();
        report
    }
}
