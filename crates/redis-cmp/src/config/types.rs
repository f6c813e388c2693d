//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Store whose keyspace is enumerated (server1).
    pub source: StoreConfig,

    /// Store checked against the source (server2).
    pub target: StoreConfig,

    /// Scan and worker behavior.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl CompareConfig {
    /// Build a configuration for two store URLs with default scan settings.
    pub fn new(source_url: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            source: StoreConfig::new(source_url),
            target: StoreConfig::new(target_url),
            scan: ScanConfig::default(),
        }
    }
}

/// Connection settings for one store.
///
/// The URL carries host, port, credentials and the logical database index,
/// e.g. `redis://:password@localhost:6379/0`.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The URL with any password replaced, safe for logs.
    pub fn redacted_url(&self) -> String {
        let Some(scheme_end) = self.url.find("://") else {
            return self.url.clone();
        };
        let rest = &self.url[scheme_end + 3..];
        let Some(at) = rest.rfind('@') else {
            return self.url.clone();
        };
        let userinfo = &rest[..at];
        match userinfo.find(':') {
            Some(colon) => format!(
                "{}{}:[REDACTED]{}",
                &self.url[..scheme_end + 3],
                &userinfo[..colon],
                &rest[at..]
            ),
            None => self.url.clone(),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.redacted_url())
            .finish()
    }
}

/// Which index window list and sorted-set reads use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    /// Read every element: `[0, len-1]` on the source, the whole collection on the target.
    #[default]
    Full,
    /// Read `[1, len]` on both sides. Skips the first element; kept for output parity
    /// with earlier comparison reports.
    Legacy,
}

/// Scan and worker behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// COUNT hint sent with every SCAN (default: 5000).
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,

    /// Per-command read timeout in seconds (default: 120).
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Cap on concurrently running batch workers. Unbounded when not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,

    /// Index window for list and sorted-set reads (default: full).
    #[serde(default)]
    pub range_mode: RangeMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_count: default_scan_count(),
            read_timeout_secs: default_read_timeout_secs(),
            max_workers: None,
            range_mode: RangeMode::default(),
        }
    }
}

fn default_scan_count() -> usize {
    5000
}

fn default_read_timeout_secs() -> u64 {
    120
}
