use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

pub const METRIC_ID_LENGTH: usize = 12;

/// Provides identifiers and default ordering for newly created metrics.
pub trait MetricIdGenerator: Send + Sync + Debug {
    fn metric_id(&self) -> String;
    fn order(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomMetricIdGenerator;

impl MetricIdGenerator for RandomMetricIdGenerator {
    fn metric_id(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(METRIC_ID_LENGTH)
            .map(char::from)
            .collect()
    }

    fn order(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Deterministic generator: `metric000001`, `metric000002`...
#[derive(Debug, Default)]
pub struct SequentialMetricIdGenerator {
    next: AtomicI64,
}

impl MetricIdGenerator for SequentialMetricIdGenerator {
    fn metric_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("metric{:06}", n)
    }

    fn order(&self) -> i64 {
        self.next.load(Ordering::SeqCst)
    }
}
