//! Comparison orchestrator - main workflow coordinator.
//!
//! Connects both stores, runs the key-count check and then the full scan.

use crate::config::CompareConfig;
use crate::error::Result;
use crate::keyspace::{self, KeyCountCheck};
use crate::report::Reporter;
use crate::scan::{ScanEngine, ScanSummary};
use crate::store::{KeyStore, RedisStore, Side};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Comparison orchestrator.
pub struct Orchestrator {
    config: CompareConfig,
    source: Arc<dyn KeyStore>,
    target: Arc<dyn KeyStore>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl Orchestrator {
    /// Validate the configuration and connect to both stores.
    pub async fn new(config: CompareConfig) -> Result<Self> {
        config.validate()?;
        info!("Comparing with configuration {}", config.to_json()?);

        let timeout = Duration::from_secs(config.scan.read_timeout_secs);
        let (source, target) = tokio::try_join!(
            RedisStore::connect(Side::Source, &config.source, timeout),
            RedisStore::connect(Side::Target, &config.target, timeout)
        )?;

        Ok(Self::with_stores(config, Arc::new(source), Arc::new(target)))
    }

    /// Build an orchestrator over already-open stores.
    pub fn with_stores(
        config: CompareConfig,
        source: Arc<dyn KeyStore>,
        target: Arc<dyn KeyStore>,
    ) -> Self {
        Self {
            config,
            source,
            target,
            reporter: None,
        }
    }

    /// Send diagnostic lines to `reporter` instead of stdout.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare total key counts of the configured databases.
    pub async fn check_key_counts(&self) -> Result<KeyCountCheck> {
        keyspace::check_key_counts(
            self.source.as_ref(),
            self.config.source.db()?,
            self.target.as_ref(),
            self.config.target.db()?,
        )
        .await
    }

    /// Scan the source keyspace and compare every key against the target.
    pub async fn run(&self) -> Result<ScanSummary> {
        let mut engine = ScanEngine::new(
            self.source.clone(),
            self.target.clone(),
            self.config.scan.clone(),
        );
        if let Some(reporter) = &self.reporter {
            engine = engine.with_reporter(reporter.clone());
        }
        engine.run().await
    }
}
