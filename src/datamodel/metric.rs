use super::{MetricStatus, MetricType};
use crate::error::MetricsError;
use crate::stack::StackResolver;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tokio::sync::OnceCell;
use tracing::debug;

/// A tracked quantity shown on the status page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub metric_id: String,

    #[serde(rename = "type")]
    pub metric_type: MetricType,

    pub title: String,

    pub unit: String,

    pub description: String,

    pub status: MetricStatus,

    pub order: i64,

    #[serde(default)]
    pub props: Map<String, Value>,

    /// Storage container of the datapoints, resolved at most once.
    #[serde(skip)]
    pub(crate) bucket_name: OnceCell<String>,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Metric {{ id: {}, type: {}, title: {}, status: {} }}",
            self.metric_id, self.metric_type, self.title, self.status
        )
    }
}

impl Metric {
    pub fn new(metric_id: String, metric_type: MetricType, title: String) -> Self {
        Self {
            metric_id,
            metric_type,
            title,
            unit: String::new(),
            description: String::new(),
            status: MetricStatus::Visible,
            order: 0,
            props: Map::new(),
            bucket_name: OnceCell::new(),
        }
    }

    pub fn with_status(mut self, status: MetricStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn is_public(&self) -> bool {
        self.status == MetricStatus::Visible
    }

    /// Name of the object-store bucket holding this metric's datapoints.
    ///
    /// The first call asks the stack resolver; later calls, including
    /// concurrent ones racing the first, reuse the cached name.
    pub async fn bucket_name(&self, resolver: &dyn StackResolver) -> Result<&str, MetricsError> {
        let name = self
            .bucket_name
            .get_or_try_init(|| async {
                let name = resolver
                    .status_page_bucket_name()
                    .await
                    .map_err(MetricsError::StackResolver)?;
                if name.is_empty() {
                    return Err(MetricsError::NotFound {
                        kind: "Status page bucket",
                        id: self.metric_id.clone(),
                    });
                }
                debug!("Resolved bucket '{}' for metric {}", name, self.metric_id);
                Ok::<_, MetricsError>(name)
            })
            .await?;
        Ok(name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StaticStackResolver;

    #[test]
    fn test_metric_json_shape() {
        let metric = Metric::new("abc".to_string(), MetricType::Datadog, "Latency".to_string())
            .with_unit("ms")
            .with_order(3);
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["metricId"], "abc");
        assert_eq!(json["type"], "Datadog");
        assert_eq!(json["unit"], "ms");
        assert_eq!(json["status"], "visible");
        assert_eq!(json["order"], 3);
        assert!(json.get("bucketName").is_none());
    }

    #[test]
    fn test_metric_display() {
        let metric = Metric::new("abc".to_string(), MetricType::Pingdom, "Uptime".to_string())
            .with_status(MetricStatus::Hidden);
        let display = format!("{}", metric);
        assert!(display.contains("abc"));
        assert!(display.contains("Pingdom"));
        assert!(display.contains("hidden"));
        assert!(!metric.is_public());
    }

    #[tokio::test]
    async fn test_bucket_name_is_resolved_once() {
        let resolver = StaticStackResolver::new("status-page-bucket");
        let metric = Metric::new("abc".to_string(), MetricType::Datadog, "Latency".to_string());

        assert_eq!(metric.bucket_name(&resolver).await.unwrap(), "status-page-bucket");
        assert_eq!(metric.bucket_name(&resolver).await.unwrap(), "status-page-bucket");
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_bucket_name_is_not_found() {
        let resolver = StaticStackResolver::new("");
        let metric = Metric::new("abc".to_string(), MetricType::Datadog, "Latency".to_string());
        match metric.bucket_name(&resolver).await {
            Err(MetricsError::NotFound { kind, .. }) => assert_eq!(kind, "Status page bucket"),
            other => panic!("Expected not found, got {:?}", other),
        }
    }
}
