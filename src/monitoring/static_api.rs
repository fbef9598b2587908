use super::{ExternalMetric, MonitoringApi};
use crate::datamodel::Datapoint;
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// One recorded `get_metric_data` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuery {
    pub metric_id: String,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Monitoring service answering from series held in memory.
///
/// Points are returned exactly as given to [`set_series`](Self::set_series),
/// without minute normalisation: callers seed them already normalised, or
/// deliberately not to exercise exact-instant matching.
#[derive(Debug, Default)]
pub struct StaticMonitoringApi {
    metrics: RwLock<Vec<ExternalMetric>>,
    series: RwLock<HashMap<String, Vec<Datapoint>>>,
    queries: RwLock<Vec<DataQuery>>,
    failing: AtomicBool,
}

impl StaticMonitoringApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_metric(&self, metric: ExternalMetric) {
        self.metrics.write().await.push(metric);
    }

    pub async fn set_series(&self, metric_id: &str, points: Vec<Datapoint>) {
        self.series
            .write()
            .await
            .insert(metric_id.to_string(), points);
    }

    pub async fn queries(&self) -> Vec<DataQuery> {
        self.queries.read().await.clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("Monitoring API unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl MonitoringApi for StaticMonitoringApi {
    async fn list_metrics(&self) -> Result<Vec<ExternalMetric>> {
        self.check_failing()?;
        Ok(self.metrics.read().await.clone())
    }

    async fn get_metric_data(
        &self,
        metric_id: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Datapoint>> {
        self.queries.write().await.push(DataQuery {
            metric_id: metric_id.to_string(),
            begin,
            end,
        });
        self.check_failing()?;
        let series = self.series.read().await;
        Ok(series
            .get(metric_id)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.timestamp >= begin && p.timestamp < end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}
