//! Types shared by store implementations.

use super::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the comparison a store (or an error) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// One step of keyspace iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Cursor to submit for the next page. `0` means the scan is complete.
    pub cursor: u64,
    /// Keys in the order the store returned them, as raw bytes.
    pub keys: Vec<Bytes>,
}

impl Page {
    pub fn new(cursor: u64, keys: Vec<Bytes>) -> Self {
        Self { cursor, keys }
    }

    /// True when this is the last page of the iteration.
    pub fn is_last(&self) -> bool {
        self.cursor == 0
    }
}

/// Structural category of a key's value, as reported by `TYPE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    String,
    Hash,
    Set,
    ZSet,
    List,
    /// Anything else: `none` for a key deleted since the scan, `stream`, module types.
    Other(String),
}

impl KeyType {
    /// Map a `TYPE` reply to a key type.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "string" => KeyType::String,
            "hash" => KeyType::Hash,
            "set" => KeyType::Set,
            "zset" => KeyType::ZSet,
            "list" => KeyType::List,
            other => KeyType::Other(other.to_string()),
        }
    }

    /// The `TYPE` reply this key type corresponds to.
    pub fn as_str(&self) -> &str {
        match self {
            KeyType::String => "string",
            KeyType::Hash => "hash",
            KeyType::Set => "set",
            KeyType::ZSet => "zset",
            KeyType::List => "list",
            KeyType::Other(name) => name,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
