use crate::datamodel::Metric;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Persistence of metric definitions.
#[async_trait]
pub trait CatalogStore: Send + Sync + Debug {
    async fn get_all(&self) -> Result<Vec<Metric>>;

    /// Every stored metric carrying this identifier. Expected to hold
    /// zero or one entry.
    async fn get_by_id(&self, metric_id: &str) -> Result<Vec<Metric>>;

    /// Inserts the metric, or replaces the entries sharing its identifier.
    async fn put(&self, metric: &Metric) -> Result<()>;
}
