use crate::datamodel::{Datapoint, Metric};
use crate::error::MetricsError;
use crate::stack::StackResolver;
use crate::storage::{ObjectStore, error::StorageError};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::debug;

pub const DAY_BUCKET_CONTENT_TYPE: &str = "application/json";

/// `metrics/{metricId}/{year}/{month}/{day}.json`, month and day unpadded.
pub fn day_bucket_key(metric_id: &str, day: NaiveDate) -> String {
    format!(
        "metrics/{}/{}/{}/{}.json",
        metric_id,
        day.year(),
        day.month(),
        day.day()
    )
}

/// Reads and overwrites whole day buckets.
#[derive(Debug, Clone)]
pub struct DayBucketStore {
    object_store: Arc<dyn ObjectStore>,
    stack_resolver: Arc<dyn StackResolver>,
}

impl DayBucketStore {
    pub fn new(object_store: Arc<dyn ObjectStore>, stack_resolver: Arc<dyn StackResolver>) -> Self {
        Self {
            object_store,
            stack_resolver,
        }
    }

    /// `Ok(None)` when the bucket does not exist. Storage failures and
    /// undecodable buckets are errors, never mistaken for missing history.
    pub async fn get_datapoints(
        &self,
        metric: &Metric,
        day: NaiveDate,
    ) -> Result<Option<Vec<Datapoint>>, MetricsError> {
        let bucket = metric.bucket_name(self.stack_resolver.as_ref()).await?;
        let key = day_bucket_key(&metric.metric_id, day);
        match self.object_store.get(bucket, &key).await? {
            None => {
                debug!("No day bucket at {}", key);
                Ok(None)
            }
            Some(body) => {
                let points: Vec<Datapoint> =
                    serde_json::from_slice(&body).map_err(StorageError::from)?;
                debug!("Loaded {} datapoints from {}", points.len(), key);
                Ok(Some(points))
            }
        }
    }

    pub async fn put_datapoints(
        &self,
        metric: &Metric,
        day: NaiveDate,
        points: &[Datapoint],
    ) -> Result<(), MetricsError> {
        let bucket = metric.bucket_name(self.stack_resolver.as_ref()).await?;
        let key = day_bucket_key(&metric.metric_id, day);
        let body = serde_json::to_vec(points).map_err(StorageError::from)?;
        self.object_store
            .put(bucket, &key, body, DAY_BUCKET_CONTENT_TYPE)
            .await?;
        debug!("Wrote {} datapoints to {}", points.len(), key);
        Ok(())
    }
}
