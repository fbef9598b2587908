use super::TimeSeries;
use crate::datamodel::{Datapoint, Metric, RawDatapoint};
use crate::error::MetricsError;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Merges new datapoints into the content of one day bucket.
///
/// A new point replaces the stored value carrying the same timestamp.
/// The result is sorted ascending and unique by timestamp.
pub fn merge_day(existing: &[Datapoint], new_points: &[Datapoint]) -> Vec<Datapoint> {
    let mut merged: BTreeMap<DateTime<Utc>, f64> = existing
        .iter()
        .map(|point| (point.timestamp, point.value))
        .collect();
    for point in new_points {
        merged.insert(point.timestamp, point.value);
    }
    merged
        .into_iter()
        .map(|(timestamp, value)| Datapoint { timestamp, value })
        .collect()
}

/// Groups datapoints by UTC calendar day, days in ascending order.
pub fn partition_by_day(points: &[Datapoint]) -> BTreeMap<NaiveDate, Vec<Datapoint>> {
    let mut days: BTreeMap<NaiveDate, Vec<Datapoint>> = BTreeMap::new();
    for point in points {
        days.entry(point.day()).or_default().push(*point);
    }
    days
}

impl TimeSeries {
    /// Inserts caller-supplied datapoints.
    ///
    /// Every timestamp is checked before any storage access: one invalid
    /// timestamp fails the whole call and nothing is written. Returns the
    /// full merged content of every day touched.
    pub async fn insert_datapoints(
        &self,
        metric: &Metric,
        points: &[RawDatapoint],
    ) -> Result<Vec<Datapoint>, MetricsError> {
        let points = points
            .iter()
            .map(RawDatapoint::parse)
            .collect::<Result<Vec<_>, _>>()?;
        self.merge_datapoints(metric, &points).await
    }

    /// Merges datapoints into their day buckets, one day after the other
    /// in ascending order. A day whose merged content equals what was
    /// stored is not written again.
    pub async fn merge_datapoints(
        &self,
        metric: &Metric,
        points: &[Datapoint],
    ) -> Result<Vec<Datapoint>, MetricsError> {
        let _guard = self.writers.lock(&metric.metric_id).await;

        let mut result = Vec::with_capacity(points.len());
        for (day, new_points) in partition_by_day(points) {
            let existing = self
                .buckets
                .get_datapoints(metric, day)
                .await?
                .unwrap_or_default();
            let merged = merge_day(&existing, &new_points);

            if merged == existing {
                debug!(
                    "Day {} of {} is unchanged, skipping write",
                    day, metric.metric_id
                );
            } else {
                self.buckets.put_datapoints(metric, day, &merged).await?;
            }
            result.extend(merged);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::datapoint::parse_timestamp;

    fn point(timestamp: &str, value: f64) -> Datapoint {
        Datapoint::new(parse_timestamp(timestamp).unwrap(), value)
    }

    #[test]
    fn test_merge_inserts_in_order() {
        let existing = vec![point("2017-07-03T01:00:00.000Z", 1.0)];
        let merged = merge_day(&existing, &[point("2017-07-03T00:00:00.000Z", 0.0)]);
        assert_eq!(
            merged,
            vec![
                point("2017-07-03T00:00:00.000Z", 0.0),
                point("2017-07-03T01:00:00.000Z", 1.0),
            ]
        );
    }

    #[test]
    fn test_merge_last_write_wins() {
        let existing = vec![point("2017-07-03T01:00:00.000Z", 1.0)];
        let merged = merge_day(&existing, &[point("2017-07-03T01:00:00.000Z", 2.0)]);
        assert_eq!(merged, vec![point("2017-07-03T01:00:00.000Z", 2.0)]);

        // Within one batch, the later duplicate wins too
        let merged = merge_day(
            &[],
            &[
                point("2017-07-03T01:00:00.000Z", 3.0),
                point("2017-07-03T01:00:00.000Z", 4.0),
            ],
        );
        assert_eq!(merged, vec![point("2017-07-03T01:00:00.000Z", 4.0)]);
    }

    #[test]
    fn test_merge_output_is_strictly_ascending() {
        let existing = vec![
            point("2017-07-03T05:00:00.000Z", 5.0),
            point("2017-07-03T02:00:00.000Z", 2.0),
            point("2017-07-03T02:00:00.000Z", 2.5),
        ];
        let new_points = vec![
            point("2017-07-03T03:00:00.000Z", 3.0),
            point("2017-07-03T01:00:00.000Z", 1.0),
            point("2017-07-03T05:00:00.000Z", 5.5),
        ];
        let merged = merge_day(&existing, &new_points);
        assert_eq!(merged.len(), 4);
        assert!(merged.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(merged[3].value, 5.5);
    }

    #[test]
    fn test_merge_of_known_points_is_unchanged() {
        let existing = vec![
            point("2017-07-03T00:00:00.000Z", 0.0),
            point("2017-07-03T01:00:00.000Z", 1.0),
        ];
        let merged = merge_day(&existing, &[point("2017-07-03T01:00:00.000Z", 1.0)]);
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_partition_by_day() {
        let days = partition_by_day(&[
            point("2017-07-03T00:00:00.000Z", 1.0),
            point("2017-07-02T23:59:59.999Z", 0.0),
            point("2017-07-03T12:00:00.000Z", 2.0),
            point("2017-07-03T02:00:00.000+04:00", 3.0),
        ]);
        let keys: Vec<_> = days.keys().map(|d| d.to_string()).collect();
        assert_eq!(keys, vec!["2017-07-02", "2017-07-03"]);
        // 02:00+04:00 is 22:00 UTC on the previous day
        assert_eq!(days.values().next().unwrap().len(), 2);
        assert_eq!(days.values().nth(1).unwrap().len(), 2);
    }
}
