use super::CatalogStore;
use crate::datamodel::Metric;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Catalog kept in memory.
///
/// Unlike the file catalog it accepts duplicate identifiers through
/// [`InMemoryCatalogStore::with_metrics`].
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    metrics: RwLock<Vec<Metric>>,
    failing: AtomicBool,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Vec<Metric>) -> Self {
        Self {
            metrics: RwLock::new(metrics),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("Catalog store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get_all(&self) -> Result<Vec<Metric>> {
        self.check_failing()?;
        Ok(self.metrics.read().await.clone())
    }

    async fn get_by_id(&self, metric_id: &str) -> Result<Vec<Metric>> {
        self.check_failing()?;
        Ok(self
            .metrics
            .read()
            .await
            .iter()
            .filter(|metric| metric.metric_id == metric_id)
            .cloned()
            .collect())
    }

    async fn put(&self, metric: &Metric) -> Result<()> {
        self.check_failing()?;
        let mut metrics = self.metrics.write().await;
        metrics.retain(|m| m.metric_id != metric.metric_id);
        metrics.push(metric.clone());
        Ok(())
    }
}
