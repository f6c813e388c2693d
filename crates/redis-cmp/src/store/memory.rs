//! In-process store with Redis read semantics.
//!
//! Keys are held in a sorted map and paged in key order. Failures and latency
//! can be injected to exercise the scan and comparison paths without a server.

use super::{Bytes, KeyStore, KeyType, Page};
use crate::error::{CompareError, Result};
use async_trait::async_trait;
use redis::{ErrorKind, RedisError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A value held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    String(Bytes),
    Hash(HashMap<Bytes, Bytes>),
    Set(HashSet<Bytes>),
    /// Members in rank order.
    ZSet(Vec<Bytes>),
    List(Vec<Bytes>),
}

impl StoredValue {
    fn key_type(&self) -> KeyType {
        match self {
            StoredValue::String(_) => KeyType::String,
            StoredValue::Hash(_) => KeyType::Hash,
            StoredValue::Set(_) => KeyType::Set,
            StoredValue::ZSet(_) => KeyType::ZSet,
            StoredValue::List(_) => KeyType::List,
        }
    }
}

/// In-memory keyspace implementing [`KeyStore`].
pub struct MemoryStore {
    name: String,
    db: i64,
    data: Mutex<BTreeMap<Bytes, StoredValue>>,
    page_size: Option<usize>,
    scripted_pages: Option<Vec<Vec<Bytes>>>,
    failing_keys: HashSet<Bytes>,
    fail_scan_on_call: Option<usize>,
    latency: Option<Duration>,
    scan_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db: 0,
            data: Mutex::new(BTreeMap::new()),
            page_size: None,
            scripted_pages: None,
            failing_keys: HashSet::new(),
            fail_scan_on_call: None,
            latency: None,
            scan_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Logical database reported by `INFO keyspace`.
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Fixed page size, overriding the COUNT hint.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Return exactly these pages from SCAN, regardless of the stored keys.
    ///
    /// Lets tests produce empty pages and keys repeated across pages, both of
    /// which a real server may return.
    pub fn with_scripted_pages(mut self, pages: Vec<Vec<&str>>) -> Self {
        self.scripted_pages = Some(
            pages
                .into_iter()
                .map(|p| p.into_iter().map(|k| k.as_bytes().to_vec()).collect())
                .collect(),
        );
        self
    }

    /// Every read of `key` fails with a connection error.
    pub fn with_failing_key(mut self, key: impl AsRef<[u8]>) -> Self {
        self.failing_keys.insert(key.as_ref().to_vec());
        self
    }

    /// The SCAN call with this zero-based index fails.
    pub fn with_scan_failure_on_call(mut self, call: usize) -> Self {
        self.fail_scan_on_call = Some(call);
        self
    }

    /// Delay every key read (not SCAN) by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, key: impl AsRef<[u8]>, value: StoredValue) {
        self.lock().insert(key.as_ref().to_vec(), value);
    }

    pub fn set(&self, key: impl AsRef<[u8]>, value: &str) {
        self.insert(key, StoredValue::String(value.as_bytes().to_vec()));
    }

    pub fn hset(&self, key: impl AsRef<[u8]>, fields: &[(&str, &str)]) {
        let map = fields
            .iter()
            .map(|(f, v)| (f.as_bytes().to_vec(), v.as_bytes().to_vec()))
            .collect();
        self.insert(key, StoredValue::Hash(map));
    }

    pub fn sadd(&self, key: impl AsRef<[u8]>, members: &[&str]) {
        let set = members.iter().map(|m| m.as_bytes().to_vec()).collect();
        self.insert(key, StoredValue::Set(set));
    }

    /// Store a sorted set whose members are already in rank order.
    pub fn zadd(&self, key: impl AsRef<[u8]>, members: &[&str]) {
        let ranked = members.iter().map(|m| m.as_bytes().to_vec()).collect();
        self.insert(key, StoredValue::ZSet(ranked));
    }

    pub fn rpush(&self, key: impl AsRef<[u8]>, items: &[&str]) {
        let list = items.iter().map(|i| i.as_bytes().to_vec()).collect();
        self.insert(key, StoredValue::List(list));
    }

    pub fn remove(&self, key: impl AsRef<[u8]>) {
        self.lock().remove(key.as_ref());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of SCAN calls served so far.
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    /// Highest number of reads that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Bytes, StoredValue>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulate a round trip: latency, in-flight accounting, injected failure.
    async fn round_trip(&self, key: &[u8]) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_keys.contains(key) {
            return Err(connection_reset());
        }
        Ok(())
    }

    fn read<T>(&self, key: &[u8], f: impl FnOnce(Option<&StoredValue>) -> Result<T>) -> Result<T> {
        let data = self.lock();
        f(data.get(key))
    }

    fn scan_scripted(pages: &[Vec<Bytes>], cursor: u64) -> Page {
        let index = cursor as usize;
        let keys = pages.get(index).cloned().unwrap_or_default();
        let next = if index + 1 < pages.len() {
            (index + 1) as u64
        } else {
            0
        };
        Page::new(next, keys)
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn scan(&self, cursor: u64, count: usize) -> Result<Page> {
        let call = self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scan_on_call == Some(call) {
            return Err(connection_reset());
        }

        if let Some(pages) = &self.scripted_pages {
            return Ok(Self::scan_scripted(pages, cursor));
        }

        let page_size = self.page_size.unwrap_or(count).max(1);
        let data = self.lock();
        let start = cursor as usize;
        let keys: Vec<Bytes> = data.keys().skip(start).take(page_size).cloned().collect();
        let end = start + keys.len();
        let next = if end < data.len() { end as u64 } else { 0 };
        Ok(Page::new(next, keys))
    }

    async fn key_type(&self, key: &[u8]) -> Result<KeyType> {
        self.round_trip(key).await?;
        self.read(key, |value| {
            Ok(value
                .map(StoredValue::key_type)
                .unwrap_or_else(|| KeyType::Other("none".to_string())))
        })
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.round_trip(key).await?;
        self.read(key, |value| match value {
            None => Ok(None),
            Some(StoredValue::String(v)) => Ok(Some(v.clone())),
            Some(_) => Err(wrong_type()),
        })
    }

    async fn hgetall(&self, key: &[u8]) -> Result<HashMap<Bytes, Bytes>> {
        self.round_trip(key).await?;
        self.read(key, |value| match value {
            None => Ok(HashMap::new()),
            Some(StoredValue::Hash(map)) => Ok(map.clone()),
            Some(_) => Err(wrong_type()),
        })
    }

    async fn smembers(&self, key: &[u8]) -> Result<HashSet<Bytes>> {
        self.round_trip(key).await?;
        self.read(key, |value| match value {
            None => Ok(HashSet::new()),
            Some(StoredValue::Set(set)) => Ok(set.clone()),
            Some(_) => Err(wrong_type()),
        })
    }

    async fn zcard(&self, key: &[u8]) -> Result<i64> {
        self.round_trip(key).await?;
        self.read(key, |value| match value {
            None => Ok(0),
            Some(StoredValue::ZSet(members)) => Ok(members.len() as i64),
            Some(_) => Err(wrong_type()),
        })
    }

    async fn zrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.round_trip(key).await?;
        self.read(key, |value| match value {
            None => Ok(Vec::new()),
            Some(StoredValue::ZSet(members)) => Ok(slice_range(members, start, stop)),
            Some(_) => Err(wrong_type()),
        })
    }

    async fn llen(&self, key: &[u8]) -> Result<i64> {
        self.round_trip(key).await?;
        self.read(key, |value| match value {
            None => Ok(0),
            Some(StoredValue::List(items)) => Ok(items.len() as i64),
            Some(_) => Err(wrong_type()),
        })
    }

    async fn lrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.round_trip(key).await?;
        self.read(key, |value| match value {
            None => Ok(Vec::new()),
            Some(StoredValue::List(items)) => Ok(slice_range(items, start, stop)),
            Some(_) => Err(wrong_type()),
        })
    }

    async fn keyspace_info(&self) -> Result<String> {
        let keys = self.len();
        let mut info = String::from("# Keyspace\r\n");
        if keys > 0 {
            info.push_str(&format!(
                "db{}:keys={},expires=0,avg_ttl=0\r\n",
                self.db, keys
            ));
        }
        Ok(info)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Inclusive index range with Redis semantics: negative indexes count from the
/// end, out-of-range bounds are clamped, an inverted range is empty.
fn slice_range(items: &[Bytes], start: i64, stop: i64) -> Vec<Bytes> {
    let len = items.len() as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return Vec::new();
    }
    items[start as usize..=stop as usize].to_vec()
}

fn connection_reset() -> CompareError {
    CompareError::Store(RedisError::from((ErrorKind::IoError, "connection reset by peer")))
}

fn wrong_type() -> CompareError {
    CompareError::Store(RedisError::from((
        ErrorKind::TypeError,
        "WRONGTYPE Operation against a key holding the wrong kind of value",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(values: &[&str]) -> Vec<Bytes> {
        values.iter().map(|v| v.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_slice_range_follows_redis_indexing() {
        let list = items(&["a", "b", "c"]);
        assert_eq!(slice_range(&list, 0, -1), items(&["a", "b", "c"]));
        assert_eq!(slice_range(&list, 1, 3), items(&["b", "c"]));
        assert_eq!(slice_range(&list, -2, -1), items(&["b", "c"]));
        assert_eq!(slice_range(&list, 2, 1), Vec::<Bytes>::new());
        assert_eq!(slice_range(&list, 5, 10), Vec::<Bytes>::new());
        assert_eq!(slice_range(&[], 0, -1), Vec::<Bytes>::new());
    }

    #[tokio::test]
    async fn test_scan_pages_cover_every_key() {
        let store = MemoryStore::new("mem").with_page_size(2);
        for i in 0..5 {
            store.set(&format!("k{}", i), "v");
        }

        let mut cursor = 0;
        let mut seen = Vec::new();
        loop {
            let page = store.scan(cursor, 100).await.unwrap();
            assert!(page.keys.len() <= 2);
            seen.extend(page.keys);
            cursor = page.cursor;
            if cursor == 0 {
                break;
            }
        }
        assert_eq!(seen, items(&["k0", "k1", "k2", "k3", "k4"]));
        assert_eq!(store.scan_calls(), 3);
    }

    #[tokio::test]
    async fn test_wrong_type_read_fails() {
        let store = MemoryStore::new("mem");
        store.hset("h", &[("f", "v")]);
        assert!(store.get(b"h").await.is_err());
        assert_eq!(store.key_type(b"h").await.unwrap(), KeyType::Hash);
    }

    #[tokio::test]
    async fn test_missing_key_reads_empty() {
        let store = MemoryStore::new("mem");
        assert_eq!(store.get(b"nope").await.unwrap(), None);
        assert!(store.hgetall(b"nope").await.unwrap().is_empty());
        assert_eq!(store.zcard(b"nope").await.unwrap(), 0);
        assert_eq!(
            store.key_type(b"nope").await.unwrap(),
            KeyType::Other("none".to_string())
        );
    }

    #[tokio::test]
    async fn test_keyspace_info_omits_empty_db() {
        let store = MemoryStore::new("mem").with_db(2);
        assert_eq!(store.keyspace_info().await.unwrap(), "# Keyspace\r\n");
        store.set("a", "1");
        assert!(store
            .keyspace_info()
            .await
            .unwrap()
            .contains("db2:keys=1,expires=0"));
    }

    #[tokio::test]
    async fn test_non_utf8_key_scans_and_reads() {
        let store = MemoryStore::new("mem");
        let key: &[u8] = b"session:\xff\xfe";
        store.set(key, "v");
        store.set("plain", "w");

        let page = store.scan(0, 10).await.unwrap();
        assert!(page.is_last());
        assert_eq!(page.keys, vec![b"plain".to_vec(), key.to_vec()]);
        assert_eq!(store.key_type(key).await.unwrap(), KeyType::String);
        assert_eq!(store.get(key).await.unwrap(), Some(b"v".to_vec()));
    }
}
