pub mod catalog_factory;
pub mod json_file;
pub mod memory;
pub mod store;

use crate::datamodel::{Metric, MetricDraft, MetricIdGenerator};
use crate::error::MetricsError;
use crate::monitoring::{ExternalMetric, MonitoringApi};
use std::sync::Arc;
use tracing::{debug, warn};

pub use store::CatalogStore;

/// Metadata operations over the stored metric definitions.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    store: Arc<dyn CatalogStore>,
    monitoring: Arc<dyn MonitoringApi>,
}

impl MetricCatalog {
    pub fn new(store: Arc<dyn CatalogStore>, monitoring: Arc<dyn MonitoringApi>) -> Self {
        Self { store, monitoring }
    }

    /// Metrics known by the monitoring service, whether or not they are
    /// in the catalog.
    pub async fn list_external(&self) -> Result<Vec<ExternalMetric>, MetricsError> {
        self.monitoring
            .list_metrics()
            .await
            .map_err(MetricsError::Monitoring)
    }

    /// Metrics shown on the public status page.
    pub async fn list_public(&self) -> Result<Vec<Metric>, MetricsError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(Metric::is_public)
            .collect())
    }

    pub async fn list(&self) -> Result<Vec<Metric>, MetricsError> {
        self.store.get_all().await.map_err(MetricsError::Catalog)
    }

    pub async fn lookup(&self, metric_id: &str) -> Result<Metric, MetricsError> {
        let mut matches = self
            .store
            .get_by_id(metric_id)
            .await
            .map_err(MetricsError::Catalog)?;
        match matches.len() {
            0 => Err(MetricsError::metric_not_found(metric_id)),
            1 => Ok(matches.remove(0)),
            n => {
                warn!("Catalog holds {} metrics with id {}", n, metric_id);
                Err(MetricsError::Integrity(format!(
                    "{} metrics share the id '{}'",
                    n, metric_id
                )))
            }
        }
    }

    /// Validates a draft for an existing metric.
    ///
    /// The identifier must resolve to exactly one catalog entry, otherwise
    /// the lookup error is returned as is. Field violations come next.
    pub async fn validate_update(&self, draft: &MetricDraft) -> Result<(), MetricsError> {
        let metric_id = draft.metric_id.as_deref().unwrap_or_default();
        if metric_id.is_empty() {
            return Err(MetricsError::metric_not_found(metric_id));
        }
        self.lookup(metric_id).await?;
        draft.validate()
    }

    pub async fn create(
        &self,
        draft: &MetricDraft,
        ids: &dyn MetricIdGenerator,
    ) -> Result<Metric, MetricsError> {
        let metric = draft.into_metric(ids)?;
        if !self
            .store
            .get_by_id(&metric.metric_id)
            .await
            .map_err(MetricsError::Catalog)?
            .is_empty()
        {
            return Err(MetricsError::Conflict {
                kind: "Metric",
                id: metric.metric_id,
            });
        }
        self.store.put(&metric).await.map_err(MetricsError::Catalog)?;
        debug!("Created {}", metric);
        Ok(metric)
    }

    pub async fn update(
        &self,
        draft: &MetricDraft,
        ids: &dyn MetricIdGenerator,
    ) -> Result<Metric, MetricsError> {
        self.validate_update(draft).await?;
        let metric = draft.into_metric(ids)?;
        self.store.put(&metric).await.map_err(MetricsError::Catalog)?;
        debug!("Updated {}", metric);
        Ok(metric)
    }
}
