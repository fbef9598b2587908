use anyhow::Result;
use status_metrics::batch::{collect_all, insert_batch};
use status_metrics::datamodel::{MetricStatus, RawDatapoint};
use status_metrics::error::MetricsError;
use status_metrics::test_utils::{TestHarness, datapoint, sample_metric, timestamp};
use std::collections::BTreeMap;

mod backfill_tests {
    use super::*;

    #[tokio::test]
    async fn test_resume_from_yesterday_without_duplicate_write() -> Result<()> {
        // Given: no bucket today, one point stored yesterday
        let harness = TestHarness::new("2017-07-03T12:00:00Z", vec![sample_metric("abc")]);
        harness
            .seed_bucket(
                "metrics/abc/2017/7/2.json",
                r#"[{"timestamp":"2017-07-02T01:00:05.000Z","value":2}]"#,
            )
            .await;
        // And the monitoring service returns that same point
        harness
            .monitoring
            .set_series("abc", vec![datapoint("2017-07-02T01:00:05Z", 2.0)])
            .await;

        // When
        let metric = harness.catalog.lookup("abc").await?;
        let merged = harness.series.collect(&metric).await?;

        // Then: the query resumes at the stored point and nothing is rewritten
        let queries = harness.monitoring.queries().await;
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].metric_id, "abc");
        assert_eq!(queries[0].begin, timestamp("2017-07-02T01:00:05Z"));
        assert_eq!(queries[0].end, timestamp("2017-07-03T12:00:00Z"));
        assert!(harness.object_store.puts().await.is_empty());
        assert_eq!(merged, vec![datapoint("2017-07-02T01:00:05Z", 2.0)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_is_idempotent() -> Result<()> {
        let harness = TestHarness::new("2017-07-03T12:00:00Z", vec![sample_metric("abc")]);
        harness
            .monitoring
            .set_series(
                "abc",
                vec![
                    datapoint("2017-07-02T23:00:00Z", 1.0),
                    datapoint("2017-07-03T00:00:00Z", 2.0),
                    datapoint("2017-07-03T11:59:00Z", 3.0),
                ],
            )
            .await;
        let metric = harness.catalog.lookup("abc").await?;

        harness.series.collect(&metric).await?;
        let keys: Vec<_> = harness
            .object_store
            .puts()
            .await
            .into_iter()
            .map(|p| p.key)
            .collect();
        assert_eq!(keys, vec!["metrics/abc/2017/7/2.json", "metrics/abc/2017/7/3.json"]);

        // Second round only receives what is already stored
        harness.object_store.clear_puts().await;
        harness.series.collect(&metric).await?;
        assert!(harness.object_store.puts().await.is_empty());

        let queries = harness.monitoring.queries().await;
        assert_eq!(queries[1].begin, timestamp("2017-07-03T11:59:00Z"));
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_picks_up_new_points_as_time_moves() -> Result<()> {
        let harness = TestHarness::new("2017-07-03T12:00:00Z", vec![sample_metric("abc")]);
        harness
            .monitoring
            .set_series("abc", vec![datapoint("2017-07-03T11:00:00Z", 1.0)])
            .await;
        let metric = harness.catalog.lookup("abc").await?;
        harness.series.collect(&metric).await?;

        // A point appears after midnight
        harness
            .monitoring
            .set_series(
                "abc",
                vec![
                    datapoint("2017-07-03T11:00:00Z", 1.0),
                    datapoint("2017-07-04T00:01:00Z", 2.0),
                ],
            )
            .await;
        harness.clock.set(timestamp("2017-07-04T00:05:00Z"));
        harness.object_store.clear_puts().await;

        let merged = harness.series.collect(&metric).await?;

        // Today's bucket is absent, yesterday is the anchor
        let queries = harness.monitoring.queries().await;
        assert_eq!(queries[1].begin, timestamp("2017-07-03T11:00:00Z"));
        let puts = harness.object_store.puts().await;
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].key, "metrics/abc/2017/7/4.json");
        assert_eq!(
            merged,
            vec![
                datapoint("2017-07-03T11:00:00Z", 1.0),
                datapoint("2017-07-04T00:01:00Z", 2.0),
            ]
        );
        Ok(())
    }
}

mod batch_tests {
    use super::*;

    fn entries(items: &[(&str, Vec<(&str, f64)>)]) -> BTreeMap<String, Vec<RawDatapoint>> {
        items
            .iter()
            .map(|(metric_id, points)| {
                (
                    metric_id.to_string(),
                    points
                        .iter()
                        .map(|(t, v)| RawDatapoint::new(*t, *v))
                        .collect(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_insert_batch_success() -> Result<()> {
        let harness = TestHarness::new(
            "2017-07-03T12:00:00Z",
            vec![sample_metric("a"), sample_metric("b")],
        );

        let merged = insert_batch(
            &harness.catalog,
            &harness.series,
            entries(&[
                ("a", vec![("2017-07-03T00:00:00Z", 1.0)]),
                ("b", vec![("2017-07-03T00:00:00Z", 2.0), ("2017-07-03T01:00:00Z", 3.0)]),
            ]),
        )
        .await
        .map_err(|errors| anyhow::anyhow!("{} batch errors", errors.len()))?;

        assert_eq!(merged["a"].len(), 1);
        assert_eq!(merged["b"].len(), 2);
        assert_eq!(harness.object_store.puts().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_batch_reports_every_failure() {
        let mut duplicate = sample_metric("dup");
        duplicate.status = MetricStatus::Hidden;
        let harness = TestHarness::new(
            "2017-07-03T12:00:00Z",
            vec![sample_metric("a"), sample_metric("b"), sample_metric("dup"), duplicate],
        );

        let result = insert_batch(
            &harness.catalog,
            &harness.series,
            entries(&[
                ("a", vec![("2017-07-03T00:00:00Z", 1.0)]),
                ("dup", vec![("2017-07-03T00:00:00Z", 1.0)]),
                ("missing", vec![("2017-07-03T00:00:00Z", 1.0)]),
                ("b", vec![("yesterday", 1.0)]),
            ]),
        )
        .await;

        let errors = match result {
            Err(errors) => errors,
            Ok(_) => panic!("Expected batch errors"),
        };
        let by_id: BTreeMap<_, _> = errors
            .iter()
            .map(|e| (e.metric_id.as_str(), &e.error))
            .collect();
        assert_eq!(by_id.len(), 3);
        assert!(matches!(by_id["dup"], MetricsError::Integrity(_)));
        assert!(matches!(by_id["missing"], MetricsError::NotFound { .. }));
        assert!(matches!(by_id["b"], MetricsError::Format(_)));

        // The valid entry was still written
        let puts = harness.object_store.puts().await;
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].key, "metrics/a/2017/7/3.json");
    }

    #[tokio::test]
    async fn test_collect_all_isolates_failures() -> Result<()> {
        let harness = TestHarness::new(
            "2017-07-03T12:00:00Z",
            vec![sample_metric("good"), sample_metric("broken"), sample_metric("idle")],
        );
        harness
            .seed_bucket("metrics/broken/2017/7/3.json", "{")
            .await;
        harness
            .monitoring
            .set_series(
                "good",
                vec![
                    datapoint("2017-07-03T10:00:00Z", 1.0),
                    datapoint("2017-07-03T11:00:00Z", 2.0),
                ],
            )
            .await;

        let report = collect_all(&harness.catalog, &harness.series, 2).await?;

        assert_eq!(report.collected.get("good"), Some(&2));
        assert_eq!(report.collected.get("idle"), Some(&0));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].metric_id, "broken");
        assert!(matches!(report.errors[0].error, MetricsError::Storage(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_all_fails_when_catalog_is_unavailable() {
        let harness = TestHarness::new("2017-07-03T12:00:00Z", vec![sample_metric("a")]);
        harness.catalog_store.set_failing(true);

        let result = collect_all(&harness.catalog, &harness.series, 1).await;
        assert!(matches!(result, Err(MetricsError::Catalog(_))));
    }
}
