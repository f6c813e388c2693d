//! Coarse key-count check run before the per-key scan.
//!
//! Parses the `dbN:keys=..,expires=..` lines of `INFO keyspace`. A count
//! mismatch is informational only and never stops the scan.

use crate::error::Result;
use crate::store::KeyStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Key counts for one logical database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceStats {
    pub db: i64,
    pub keys: u64,
    pub expires: u64,
}

impl KeyspaceStats {
    /// Find the line for `db` in an `INFO keyspace` reply.
    ///
    /// Redis omits empty databases, so a missing line means zero keys.
    pub fn parse(info: &str, db: i64) -> Self {
        let prefix = format!("db{}:", db);
        let mut stats = Self {
            db,
            ..Default::default()
        };

        let Some(line) = info.lines().map(str::trim).find(|l| l.starts_with(&prefix)) else {
            return stats;
        };

        for field in line[prefix.len()..].split(',') {
            match field.split_once('=') {
                Some(("keys", v)) => stats.keys = v.parse().unwrap_or(0),
                Some(("expires", v)) => stats.expires = v.parse().unwrap_or(0),
                _ => {}
            }
        }
        stats
    }

    /// `db0:keys=123`, the form printed in the count line.
    pub fn label(&self) -> String {
        format!("db{}:keys={}", self.db, self.keys)
    }
}

/// Source and target key counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCountCheck {
    pub source: KeyspaceStats,
    pub target: KeyspaceStats,
}

impl KeyCountCheck {
    pub fn counts_match(&self) -> bool {
        self.source.keys == self.target.keys
    }

    /// Line printed before the scan starts.
    pub fn summary_line(&self) -> String {
        format!(
            "Source: {}, Target: {}",
            self.source.label(),
            self.target.label()
        )
    }
}

/// Line printed when the counts differ.
pub const COUNT_MISMATCH_LINE: &str = "ERROR!!!DB0 Total keys number not equals.";

/// Read key counts for the configured databases of both stores.
pub async fn check_key_counts(
    source: &dyn KeyStore,
    source_db: i64,
    target: &dyn KeyStore,
    target_db: i64,
) -> Result<KeyCountCheck> {
    let (source_info, target_info) = tokio::join!(source.keyspace_info(), target.keyspace_info());

    let check = KeyCountCheck {
        source: KeyspaceStats::parse(&source_info?, source_db),
        target: KeyspaceStats::parse(&target_info?, target_db),
    };

    if !check.counts_match() {
        warn!(
            "Key counts differ: source has {}, target has {}",
            check.source.keys, check.target.keys
        );
    }
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const INFO: &str = "# Keyspace\r\ndb0:keys=1523,expires=12,avg_ttl=3600\r\ndb3:keys=7,expires=0,avg_ttl=0\r\n";

    #[test]
    fn test_parse_selected_db() {
        let stats = KeyspaceStats::parse(INFO, 0);
        assert_eq!(stats.keys, 1523);
        assert_eq!(stats.expires, 12);

        let stats = KeyspaceStats::parse(INFO, 3);
        assert_eq!(stats.keys, 7);
        assert_eq!(stats.label(), "db3:keys=7");
    }

    #[test]
    fn test_missing_db_is_empty() {
        let stats = KeyspaceStats::parse(INFO, 1);
        assert_eq!(stats.keys, 0);
        assert_eq!(stats.label(), "db1:keys=0");
    }

    #[test]
    fn test_db1_does_not_match_db10() {
        let info = "# Keyspace\r\ndb10:keys=5,expires=0,avg_ttl=0\r\n";
        assert_eq!(KeyspaceStats::parse(info, 1).keys, 0);
        assert_eq!(KeyspaceStats::parse(info, 10).keys, 5);
    }

    #[tokio::test]
    async fn test_check_key_counts() {
        let source = MemoryStore::new("source");
        let target = MemoryStore::new("target");
        source.set("a", "1");
        source.set("b", "2");
        target.set("a", "1");

        let check = check_key_counts(&source, 0, &target, 0).await.unwrap();
        assert!(!check.counts_match());
        assert_eq!(check.summary_line(), "Source: db0:keys=2, Target: db0:keys=1");

        target.set("b", "2");
        let check = check_key_counts(&source, 0, &target, 0).await.unwrap();
        assert!(check.counts_match());
    }
}
