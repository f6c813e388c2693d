//! Per-key comparison between the source and target stores.
//!
//! The key's type is read once, from the source, and selects both the read
//! command and the equality used for both sides:
//!
//! - **hash**: field/value maps, order ignored
//! - **set**: member sets, order ignored
//! - **zset** / **list**: sequences in stored order
//! - **string** and anything else: scalar bytes, absent distinct from empty
//!
//! A failed read produces [`Verdict::Error`] rather than being folded into a
//! match or mismatch. The one exception is a `WRONGTYPE` rejection from the
//! target: the target holds the key under another type, which is a mismatch.

mod types;

pub use types::{ComparisonResult, Verdict, Window};

use crate::config::RangeMode;
use crate::error::CompareError;
use crate::store::{display_key, KeyStore, KeyType, Side};
use std::sync::Arc;
use tracing::debug;

/// A failed read, tagged with the side it happened on.
struct SideError {
    side: Side,
    error: CompareError,
}

fn on(side: Side) -> impl FnOnce(CompareError) -> SideError {
    move |error| SideError { side, error }
}

type Outcome = std::result::Result<bool, SideError>;

/// Compares single keys across two stores.
pub struct Comparator {
    source: Arc<dyn KeyStore>,
    target: Arc<dyn KeyStore>,
    range_mode: RangeMode,
}

impl Comparator {
    pub fn new(source: Arc<dyn KeyStore>, target: Arc<dyn KeyStore>, range_mode: RangeMode) -> Self {
        Self {
            source,
            target,
            range_mode,
        }
    }

    /// Compare `key` on both stores.
    pub async fn compare(&self, key: &[u8]) -> ComparisonResult {
        let key_type = match self.source.key_type(key).await {
            Ok(key_type) => key_type,
            Err(error) => {
                return ComparisonResult {
                    key: key.to_vec(),
                    key_type: None,
                    verdict: Verdict::Error {
                        side: Side::Source,
                        message: error.to_string(),
                    },
                };
            }
        };

        let verdict = match self.compare_typed(key, &key_type).await {
            Ok(true) => Verdict::Match,
            Ok(false) => Verdict::Mismatch,
            Err(SideError {
                side: Side::Target,
                error,
            }) if error.is_wrong_type() => {
                debug!("{}: target holds another type than {}", display_key(key), key_type);
                Verdict::Mismatch
            }
            Err(SideError { side, error }) => Verdict::Error {
                side,
                message: error.to_string(),
            },
        };
        debug!("{} ({}): {}", display_key(key), key_type, verdict);

        ComparisonResult {
            key: key.to_vec(),
            key_type: Some(key_type),
            verdict,
        }
    }

    async fn compare_typed(&self, key: &[u8], key_type: &KeyType) -> Outcome {
        match key_type {
            KeyType::Hash => self.compare_hash(key).await,
            KeyType::Set => self.compare_set(key).await,
            KeyType::ZSet => self.compare_zset(key).await,
            KeyType::List => self.compare_list(key).await,
            KeyType::String | KeyType::Other(_) => self.compare_scalar(key).await,
        }
    }

    async fn compare_hash(&self, key: &[u8]) -> Outcome {
        let (source, target) = tokio::join!(self.source.hgetall(key), self.target.hgetall(key));
        Ok(source.map_err(on(Side::Source))? == target.map_err(on(Side::Target))?)
    }

    async fn compare_set(&self, key: &[u8]) -> Outcome {
        let (source, target) =
            tokio::join!(self.source.smembers(key), self.target.smembers(key));
        Ok(source.map_err(on(Side::Source))? == target.map_err(on(Side::Target))?)
    }

    async fn compare_zset(&self, key: &[u8]) -> Outcome {
        let len = self.source.zcard(key).await.map_err(on(Side::Source))?;
        let (source_window, target_window) = self.windows(len);
        let (source, target) = tokio::join!(
            self.source.zrange(key, source_window.start, source_window.stop),
            self.target.zrange(key, target_window.start, target_window.stop)
        );
        Ok(source.map_err(on(Side::Source))? == target.map_err(on(Side::Target))?)
    }

    async fn compare_list(&self, key: &[u8]) -> Outcome {
        let len = self.source.llen(key).await.map_err(on(Side::Source))?;
        let (source_window, target_window) = self.windows(len);
        let (source, target) = tokio::join!(
            self.source.lrange(key, source_window.start, source_window.stop),
            self.target.lrange(key, target_window.start, target_window.stop)
        );
        Ok(source.map_err(on(Side::Source))? == target.map_err(on(Side::Target))?)
    }

    async fn compare_scalar(&self, key: &[u8]) -> Outcome {
        let (source, target) = tokio::join!(self.source.get(key), self.target.get(key));
        Ok(source.map_err(on(Side::Source))? == target.map_err(on(Side::Target))?)
    }

    /// Read windows for a collection whose source length is `len`.
    ///
    /// Full mode reads the whole target so trailing extras count as a difference.
    fn windows(&self, len: i64) -> (Window, Window) {
        match self.range_mode {
            RangeMode::Full => (Window::new(0, len - 1), Window::all()),
            RangeMode::Legacy => (Window::new(1, len), Window::new(1, len)),
        }
    }
}
