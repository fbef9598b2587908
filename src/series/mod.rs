//! Time-series engine: day-partitioned buckets in the object store, the
//! merge-insert that reconciles new datapoints with them, and the backfill
//! collector resuming from the latest stored datapoint.

pub mod backfill;
pub mod day_bucket;
pub mod merge;

use crate::clock::Clock;
use crate::datamodel::{Datapoint, Metric};
use crate::error::MetricsError;
use crate::monitoring::MonitoringApi;
use crate::stack::StackResolver;
use crate::storage::ObjectStore;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

pub use day_bucket::DayBucketStore;

/// How many days before today `collect()` looks for an anchor bucket.
pub const DEFAULT_MAX_BACKFILL_DAYS: u32 = 1;

/// Upper bound of the anchor search, one GET per inspected day.
pub const MAX_BACKFILL_DAYS: u32 = 31;

/// Per-metric async mutexes.
///
/// A day bucket is read, merged and overwritten without any conditional
/// write in the object store, so writers of the same metric must not
/// interleave.
#[derive(Debug, Default)]
pub struct WriterLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WriterLocks {
    pub async fn lock(&self, metric_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(metric_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Debug)]
pub struct TimeSeries {
    buckets: DayBucketStore,
    monitoring: Arc<dyn MonitoringApi>,
    clock: Arc<dyn Clock>,
    writers: WriterLocks,
    max_backfill_days: u32,
}

impl TimeSeries {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        stack_resolver: Arc<dyn StackResolver>,
        monitoring: Arc<dyn MonitoringApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            buckets: DayBucketStore::new(object_store, stack_resolver),
            monitoring,
            clock,
            writers: WriterLocks::default(),
            max_backfill_days: DEFAULT_MAX_BACKFILL_DAYS,
        }
    }

    /// Clamped to [`MAX_BACKFILL_DAYS`].
    pub fn with_max_backfill_days(mut self, max_backfill_days: u32) -> Self {
        if max_backfill_days > MAX_BACKFILL_DAYS {
            warn!(
                "Backfill lookback of {} days capped to {}",
                max_backfill_days, MAX_BACKFILL_DAYS
            );
        }
        self.max_backfill_days = max_backfill_days.min(MAX_BACKFILL_DAYS);
        self
    }

    /// All datapoints of one UTC day, `None` when the day has no bucket.
    pub async fn get_datapoints(
        &self,
        metric: &Metric,
        day: NaiveDate,
    ) -> Result<Option<Vec<Datapoint>>, MetricsError> {
        self.buckets.get_datapoints(metric, day).await
    }
}
