//! Configuration validation.

use super::{CompareConfig, StoreConfig};
use crate::error::{CompareError, Result};
use redis::IntoConnectionInfo;
use tracing::warn;

const SCHEMES: &[&str] = &["redis://", "rediss://", "unix://", "redis+unix://"];

/// Validate the configuration.
pub fn validate(config: &CompareConfig) -> Result<()> {
    validate_store("source", &config.source)?;
    validate_store("target", &config.target)?;

    if config.source.url == config.target.url {
        warn!("source and target point at the same store; every key will match");
    }

    if config.scan.scan_count == 0 {
        return Err(CompareError::Config(
            "scan.scan_count must be at least 1".into(),
        ));
    }
    if config.scan.read_timeout_secs == 0 {
        return Err(CompareError::Config(
            "scan.read_timeout_secs must be at least 1".into(),
        ));
    }
    if let Some(0) = config.scan.max_workers {
        return Err(CompareError::Config(
            "scan.max_workers must be at least 1".into(),
        ));
    }

    Ok(())
}

fn validate_store(side: &str, store: &StoreConfig) -> Result<()> {
    if store.url.is_empty() {
        return Err(CompareError::Config(format!("{}.url is required", side)));
    }
    if !SCHEMES.iter().any(|s| store.url.starts_with(s)) {
        return Err(CompareError::Config(format!(
            "{}.url must start with one of {}, got '{}'",
            side,
            SCHEMES.join(", "),
            store.redacted_url()
        )));
    }
    store.url.as_str().into_connection_info().map_err(|e| {
        CompareError::Config(format!("{}.url is invalid: {}", side, e))
    })?;
    Ok(())
}
