use crate::catalog::MetricCatalog;
use crate::datamodel::{Datapoint, RawDatapoint};
use crate::error::MetricsError;
use crate::series::TimeSeries;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Failure of one entry of a batch.
#[derive(Debug)]
pub struct BatchError {
    pub metric_id: String,
    pub error: MetricsError,
}

/// Inserts datapoints for several metrics.
///
/// Each entry is looked up in the catalog then inserted; a failing entry
/// does not stop the others. The outcome is all or nothing from the
/// caller's point of view: either every merged series, or every error.
pub async fn insert_batch(
    catalog: &MetricCatalog,
    series: &TimeSeries,
    entries: BTreeMap<String, Vec<RawDatapoint>>,
) -> Result<BTreeMap<String, Vec<Datapoint>>, Vec<BatchError>> {
    let mut successes = BTreeMap::new();
    let mut errors = Vec::new();

    for (metric_id, points) in entries {
        let result = match catalog.lookup(&metric_id).await {
            Ok(metric) => series.insert_datapoints(&metric, &points).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(merged) => {
                successes.insert(metric_id, merged);
            }
            Err(error) => {
                warn!("Failed to insert datapoints for {}: {}", metric_id, error);
                errors.push(BatchError { metric_id, error });
            }
        }
    }

    if errors.is_empty() {
        Ok(successes)
    } else {
        Err(errors)
    }
}

/// Outcome of a collection round over the whole catalog.
#[derive(Debug, Default)]
pub struct CollectReport {
    /// Number of datapoints in the days touched, per metric
    pub collected: BTreeMap<String, usize>,
    pub errors: Vec<BatchError>,
}

/// Runs `collect()` for every catalog metric, `concurrency` at a time.
///
/// Metrics never share a day bucket, so they can be collected in parallel.
pub async fn collect_all(
    catalog: &MetricCatalog,
    series: &TimeSeries,
    concurrency: usize,
) -> Result<CollectReport, MetricsError> {
    let metrics = catalog.list().await?;

    let outcomes: Vec<_> = futures::stream::iter(metrics)
        .map(|metric| async move {
            let result = series.collect(&metric).await;
            (metric.metric_id, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = CollectReport::default();
    for (metric_id, result) in outcomes {
        match result {
            Ok(points) => {
                report.collected.insert(metric_id, points.len());
            }
            Err(error) => {
                error!("Collection failed for {}: {}", metric_id, error);
                report.errors.push(BatchError { metric_id, error });
            }
        }
    }
    info!(
        "Collection round done: {} succeeded, {} failed",
        report.collected.len(),
        report.errors.len()
    );
    Ok(report)
}

/// Collects the whole catalog every `period`, forever.
pub async fn run_collection_schedule(
    catalog: MetricCatalog,
    series: Arc<TimeSeries>,
    concurrency: usize,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if let Err(err) = collect_all(&catalog, &series, concurrency).await {
            error!("Collection round aborted: {}", err);
        }
    }
}
