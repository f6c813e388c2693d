//! Key-value store access.
//!
//! The comparison engine only talks to stores through [`KeyStore`]. Two
//! implementations exist: [`RedisStore`] for live servers and [`MemoryStore`],
//! an in-process keyspace used by tests.

mod memory;
mod redis_store;
mod types;

pub use memory::{MemoryStore, StoredValue};
pub use redis_store::RedisStore;
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Raw key or value bytes. Redis is binary-safe, so no UTF-8 is assumed.
pub type Bytes = Vec<u8>;

/// Printable form of a key. Invalid UTF-8 sequences become U+FFFD.
pub fn display_key(key: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(key)
}

/// Read-only operations the comparison needs from a store.
///
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Fetch the page of keys following `cursor` (`SCAN cursor COUNT count`).
    async fn scan(&self, cursor: u64, count: usize) -> Result<Page>;

    /// Type of the value stored at `key` (`TYPE`).
    async fn key_type(&self, key: &[u8]) -> Result<KeyType>;

    /// Scalar value, `None` when the key does not exist (`GET`).
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// All fields and values of a hash (`HGETALL`).
    async fn hgetall(&self, key: &[u8]) -> Result<HashMap<Bytes, Bytes>>;

    /// All members of a set (`SMEMBERS`).
    async fn smembers(&self, key: &[u8]) -> Result<HashSet<Bytes>>;

    /// Number of members in a sorted set (`ZCARD`).
    async fn zcard(&self, key: &[u8]) -> Result<i64>;

    /// Sorted-set members by rank, inclusive on both ends (`ZRANGE`).
    async fn zrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>>;

    /// Length of a list (`LLEN`).
    async fn llen(&self, key: &[u8]) -> Result<i64>;

    /// List elements by index, inclusive on both ends (`LRANGE`).
    async fn lrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>>;

    /// Raw `INFO keyspace` reply.
    async fn keyspace_info(&self) -> Result<String>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
