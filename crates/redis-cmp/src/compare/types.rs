//! Comparison outcomes.

use crate::store::{display_key, Bytes, KeyType, Side};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Outcome of comparing one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    /// Both sides hold the same value.
    Match,
    /// The values differ.
    Mismatch,
    /// A read failed, so no verdict on the values could be reached.
    Error { side: Side, message: String },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Match => write!(f, "match"),
            Verdict::Mismatch => write!(f, "mismatch"),
            Verdict::Error { side, message } => write!(f, "error on {}: {}", side, message),
        }
    }
}

/// Result of comparing one key across both stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Raw key bytes.
    pub key: Bytes,
    /// Type observed on the source; `None` when the type lookup itself failed.
    pub key_type: Option<KeyType>,
    pub verdict: Verdict,
}

impl ComparisonResult {
    /// Key for printing.
    pub fn display_key(&self) -> Cow<'_, str> {
        display_key(&self.key)
    }

    pub fn is_match(&self) -> bool {
        self.verdict == Verdict::Match
    }

    pub fn is_mismatch(&self) -> bool {
        self.verdict == Verdict::Mismatch
    }

    pub fn is_error(&self) -> bool {
        matches!(self.verdict, Verdict::Error { .. })
    }
}

/// Inclusive index window for a ranged read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub stop: i64,
}

impl Window {
    pub fn new(start: i64, stop: i64) -> Self {
        Self { start, stop }
    }

    /// The whole collection.
    pub fn all() -> Self {
        Self::new(0, -1)
    }
}
