pub mod static_api;

use crate::datamodel::{Datapoint, MetricType};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use utoipa::ToSchema;

pub use static_api::StaticMonitoringApi;

/// A metric as known by the external monitoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMetric {
    pub metric_id: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub metric_type: MetricType,
    pub name: String,
}

/// External monitoring service the datapoints are collected from.
///
/// Returned timestamps are expected at minute granularity, with seconds
/// and sub-second parts zeroed.
#[async_trait]
pub trait MonitoringApi: Send + Sync + Debug {
    async fn list_metrics(&self) -> Result<Vec<ExternalMetric>>;

    /// Datapoints of one metric within `[begin, end)`.
    async fn get_metric_data(
        &self,
        metric_id: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Datapoint>>;
}
