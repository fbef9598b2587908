use crate::catalog::MetricCatalog;
use crate::catalog::memory::InMemoryCatalogStore;
use crate::clock::FixedClock;
use crate::datamodel::datapoint::parse_timestamp;
use crate::datamodel::{Datapoint, Metric, MetricStatus, MetricType, SequentialMetricIdGenerator};
use crate::monitoring::StaticMonitoringApi;
use crate::series::TimeSeries;
use crate::stack::StaticStackResolver;
use crate::storage::memory::InMemoryObjectStore;
use std::sync::Arc;

pub mod http;

/// Bucket name served by the harness stack resolver
pub const TEST_BUCKET: &str = "status-page-test";

/// A metric engine wired to in-memory collaborators.
///
/// Every collaborator is kept so tests can seed and inspect it.
pub struct TestHarness {
    pub object_store: Arc<InMemoryObjectStore>,
    pub catalog_store: Arc<InMemoryCatalogStore>,
    pub monitoring: Arc<StaticMonitoringApi>,
    pub stack_resolver: Arc<StaticStackResolver>,
    pub clock: Arc<FixedClock>,
    pub ids: Arc<SequentialMetricIdGenerator>,
    pub catalog: MetricCatalog,
    pub series: Arc<TimeSeries>,
}

impl TestHarness {
    /// Harness whose clock reads `now`, an RFC 3339 timestamp.
    pub fn new(now: &str, metrics: Vec<Metric>) -> Self {
        Self::with_max_backfill_days(now, metrics, 1)
    }

    pub fn with_max_backfill_days(now: &str, metrics: Vec<Metric>, max_backfill_days: u32) -> Self {
        let object_store = Arc::new(InMemoryObjectStore::new());
        let catalog_store = Arc::new(InMemoryCatalogStore::with_metrics(metrics));
        let monitoring = Arc::new(StaticMonitoringApi::new());
        let stack_resolver = Arc::new(StaticStackResolver::new(TEST_BUCKET));
        let clock = Arc::new(FixedClock::new(timestamp(now)));

        let catalog = MetricCatalog::new(catalog_store.clone(), monitoring.clone());
        let series = Arc::new(
            TimeSeries::new(
                object_store.clone(),
                stack_resolver.clone(),
                monitoring.clone(),
                clock.clone(),
            )
            .with_max_backfill_days(max_backfill_days),
        );

        Self {
            object_store,
            catalog_store,
            monitoring,
            stack_resolver,
            clock,
            ids: Arc::new(SequentialMetricIdGenerator::default()),
            catalog,
            series,
        }
    }

    /// Stores raw bytes at a day bucket key of the harness bucket.
    pub async fn seed_bucket(&self, key: &str, body: &str) {
        self.object_store
            .seed(TEST_BUCKET, key, body.as_bytes().to_vec())
            .await;
    }
}

/// A visible CloudWatch metric.
pub fn sample_metric(metric_id: &str) -> Metric {
    Metric::new(
        metric_id.to_string(),
        MetricType::CloudWatch,
        format!("Metric {}", metric_id),
    )
    .with_status(MetricStatus::Visible)
    .with_unit("ms")
}

/// Parses an RFC 3339 timestamp, panicking on malformed input.
pub fn timestamp(s: &str) -> chrono::DateTime<chrono::Utc> {
    parse_timestamp(s).unwrap_or_else(|err| panic!("Invalid test timestamp {}: {}", s, err))
}

pub fn datapoint(s: &str, value: f64) -> Datapoint {
    Datapoint::new(timestamp(s), value)
}
