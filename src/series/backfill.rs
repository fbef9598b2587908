use super::TimeSeries;
use crate::datamodel::datapoint::{format_timestamp, start_of_day};
use crate::datamodel::{Datapoint, Metric};
use crate::error::MetricsError;
use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::{debug, info};

impl TimeSeries {
    /// Instant from which collection resumes.
    ///
    /// Walks back from `today`, at most `max_backfill_days` days, until a
    /// day bucket exists. That bucket is the anchor: collection resumes at
    /// its latest datapoint, or at the start of its day when it is empty.
    /// Without any anchor, collection starts at the oldest day inspected.
    pub async fn find_resume_instant(
        &self,
        metric: &Metric,
        today: NaiveDate,
    ) -> Result<DateTime<Utc>, MetricsError> {
        let oldest = today
            .checked_sub_days(Days::new(u64::from(self.max_backfill_days)))
            .unwrap_or(NaiveDate::MIN);

        let mut day = today;
        loop {
            if let Some(points) = self.buckets.get_datapoints(metric, day).await? {
                let resume = points
                    .iter()
                    .map(|point| point.timestamp)
                    .max()
                    .unwrap_or_else(|| start_of_day(day));
                debug!(
                    "Anchor of {} is {}, resuming at {}",
                    metric.metric_id,
                    day,
                    format_timestamp(&resume)
                );
                return Ok(resume);
            }
            match day.pred_opt() {
                Some(previous) if day > oldest => day = previous,
                _ => break,
            }
        }

        info!(
            "No history for {} since {}, backfilling from the start of that day",
            metric.metric_id, oldest
        );
        Ok(start_of_day(oldest))
    }

    /// Pulls the datapoints recorded by the monitoring service since the
    /// last stored one and merges them into the day buckets.
    ///
    /// Safe to re-run: datapoints already stored are recognised by their
    /// timestamp, and unchanged days are not written.
    pub async fn collect(&self, metric: &Metric) -> Result<Vec<Datapoint>, MetricsError> {
        let now = self.clock.now();
        let resume = self.find_resume_instant(metric, now.date_naive()).await?;

        let points = self
            .monitoring
            .get_metric_data(&metric.metric_id, resume, now)
            .await
            .map_err(MetricsError::Monitoring)?;
        info!(
            "Fetched {} datapoints for {} since {}",
            points.len(),
            metric.metric_id,
            format_timestamp(&resume)
        );

        self.merge_datapoints(metric, &points).await
    }
}
