//! Redis-backed store over a multiplexed async connection.

use super::{Bytes, KeyStore, KeyType, Page, Side};
use crate::config::StoreConfig;
use crate::error::{CompareError, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisResult};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// A live Redis server.
///
/// The multiplexed connection pipelines requests from every clone over one
/// socket, so a single `RedisStore` can be shared by all batch workers.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    name: String,
    read_timeout: Duration,
}

impl RedisStore {
    /// Open a connection to the store described by `config`.
    pub async fn connect(side: Side, config: &StoreConfig, read_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| CompareError::connection(side.to_string(), e.to_string()))?;

        let conn = tokio::time::timeout(read_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| {
                CompareError::connection(
                    side.to_string(),
                    format!("timed out after {}s", read_timeout.as_secs()),
                )
            })?
            .map_err(|e| CompareError::connection(side.to_string(), e.to_string()))?;

        info!("Connected to {} store at {}", side, config.redacted_url());

        Ok(Self {
            conn,
            name: side.to_string(),
            read_timeout,
        })
    }

    /// Await a command, failing with `Timeout` after the read timeout.
    async fn timed<T, F>(&self, command: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.read_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CompareError::Timeout {
                command: command.to_string(),
                secs: self.read_timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn scan(&self, cursor: u64, count: usize) -> Result<Page> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(cursor).arg("COUNT").arg(count);

        let (next, keys): (u64, Vec<Bytes>) =
            self.timed("SCAN", cmd.query_async(&mut conn)).await?;
        debug!(
            "{}: SCAN {} returned {} keys, next cursor {}",
            self.name,
            cursor,
            keys.len(),
            next
        );
        Ok(Page::new(next, keys))
    }

    async fn key_type(&self, key: &[u8]) -> Result<KeyType> {
        let mut conn = self.conn.clone();
        let name: String = self.timed("TYPE", conn.key_type(key)).await?;
        Ok(KeyType::from_type_name(&name))
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let mut conn = self.conn.clone();
        self.timed("GET", conn.get(key)).await
    }

    async fn hgetall(&self, key: &[u8]) -> Result<HashMap<Bytes, Bytes>> {
        let mut conn = self.conn.clone();
        self.timed("HGETALL", conn.hgetall(key)).await
    }

    async fn smembers(&self, key: &[u8]) -> Result<HashSet<Bytes>> {
        let mut conn = self.conn.clone();
        self.timed("SMEMBERS", conn.smembers(key)).await
    }

    async fn zcard(&self, key: &[u8]) -> Result<i64> {
        let mut conn = self.conn.clone();
        self.timed("ZCARD", conn.zcard(key)).await
    }

    async fn zrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>> {
        let mut conn = self.conn.clone();
        self.timed("ZRANGE", conn.zrange(key, start as isize, stop as isize))
            .await
    }

    async fn llen(&self, key: &[u8]) -> Result<i64> {
        let mut conn = self.conn.clone();
        self.timed("LLEN", conn.llen(key)).await
    }

    async fn lrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>> {
        let mut conn = self.conn.clone();
        self.timed("LRANGE", conn.lrange(key, start as isize, stop as isize))
            .await
    }

    async fn keyspace_info(&self) -> Result<String> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("INFO");
        cmd.arg("keyspace");
        self.timed("INFO", cmd.query_async(&mut conn)).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
