pub mod datapoint;
pub mod metric;
pub mod metric_draft;
pub mod metric_id;
pub mod metric_type;

pub use datapoint::{Datapoint, RawDatapoint};
pub use metric::Metric;
pub use metric_draft::MetricDraft;
pub use metric_id::{MetricIdGenerator, RandomMetricIdGenerator, SequentialMetricIdGenerator};
pub use metric_type::{MetricStatus, MetricType};
