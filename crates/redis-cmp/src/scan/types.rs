//! Type definitions for scan runs.

use crate::compare::{ComparisonResult, Verdict};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the scan driver and every batch worker.
#[derive(Debug, Default)]
pub struct ScanStats {
    pages_scanned: AtomicU64,
    batches: AtomicU64,
    keys_checked: AtomicU64,
    mismatches: AtomicU64,
    errors: AtomicU64,
}

impl ScanStats {
    pub fn page_scanned(&self) {
        self.pages_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batch_launched(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record(&self, result: &ComparisonResult) {
        self.keys_checked.fetch_add(1, Ordering::Relaxed);
        match result.verdict {
            Verdict::Match => {}
            Verdict::Mismatch => {
                self.mismatches.fetch_add(1, Ordering::Relaxed);
            }
            Verdict::Error { .. } => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn keys_checked(&self) -> u64 {
        self.keys_checked.load(Ordering::Relaxed)
    }

    pub fn mismatches(&self) -> u64 {
        self.mismatches.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Result of a completed scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Unique run identifier.
    pub run_id: String,

    /// When the scan started.
    pub started_at: DateTime<Utc>,

    /// When the last batch worker finished.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// SCAN calls made, including empty pages.
    pub pages_scanned: u64,

    /// Batch workers launched (non-empty pages).
    pub batches: u64,

    /// Keys compared. Counts a key again if SCAN returned it twice.
    pub keys_checked: u64,

    /// Keys whose values differ.
    pub mismatches: u64,

    /// Keys that could not be compared.
    pub errors: u64,
}

impl ScanSummary {
    pub(crate) fn from_stats(
        run_id: String,
        started_at: DateTime<Utc>,
        stats: &ScanStats,
    ) -> Self {
        let completed_at = Utc::now();
        Self {
            run_id,
            started_at,
            completed_at,
            duration_seconds: (completed_at - started_at).num_milliseconds() as f64 / 1000.0,
            pages_scanned: stats.pages_scanned.load(Ordering::Relaxed),
            batches: stats.batches.load(Ordering::Relaxed),
            keys_checked: stats.keys_checked(),
            mismatches: stats.mismatches(),
            errors: stats.errors(),
        }
    }

    /// True when every compared key matched.
    pub fn is_consistent(&self) -> bool {
        self.mismatches == 0 && self.errors == 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Side;

    fn result(verdict: Verdict) -> ComparisonResult {
        ComparisonResult {
            key: b"k".to_vec(),
            key_type: None,
            verdict,
        }
    }

    #[test]
    fn test_record_counts_each_verdict() {
        let stats = ScanStats::default();
        stats.record(&result(Verdict::Match));
        stats.record(&result(Verdict::Mismatch));
        stats.record(&result(Verdict::Error {
            side: Side::Target,
            message: "boom".to_string(),
        }));

        assert_eq!(stats.keys_checked(), 3);
        assert_eq!(stats.mismatches(), 1);
        assert_eq!(stats.errors(), 1);
    }

    #[test]
    fn test_summary_json() {
        let stats = ScanStats::default();
        stats.page_scanned();
        stats.batch_launched();
        stats.record(&result(Verdict::Match));

        let summary = ScanSummary::from_stats("run-1".to_string(), Utc::now(), &stats);
        assert!(summary.is_consistent());

        let json = summary.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["run_id"], "run-1");
        assert_eq!(value["keys_checked"], 1);
        assert_eq!(value["pages_scanned"], 1);
    }
}
