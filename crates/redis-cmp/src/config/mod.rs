//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::{CompareError, Result};
use redis::IntoConnectionInfo;

impl CompareConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Serialize the configuration (passwords redacted) for logging.
    pub fn to_json(&self) -> Result<String> {
        let mut redacted = self.clone();
        redacted.source.url = self.source.redacted_url();
        redacted.target.url = self.target.redacted_url();
        Ok(serde_json::to_string(&redacted)?)
    }
}

impl StoreConfig {
    /// Logical database index encoded in the URL (0 when absent).
    pub fn db(&self) -> Result<i64> {
        let info = self
            .url
            .as_str()
            .into_connection_info()
            .map_err(|e| CompareError::Config(format!("invalid store url: {}", e)))?;
        Ok(info.redis.db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_from_url() {
        assert_eq!(StoreConfig::new("redis://localhost:6379/3").db().unwrap(), 3);
        assert_eq!(StoreConfig::new("redis://localhost:6379").db().unwrap(), 0);
    }

    #[test]
    fn test_to_json_redacts() {
        let config = CompareConfig::new("redis://:pw1@a:6379/0", "redis://:pw2@b:6379/0");
        let json = config.to_json().unwrap();
        assert!(!json.contains("pw1"));
        assert!(!json.contains("pw2"));
        assert!(json.contains("\"scan_count\":5000"));
    }
}
