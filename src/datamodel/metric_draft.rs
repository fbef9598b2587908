use super::{Metric, MetricIdGenerator, MetricStatus, MetricType};
use crate::error::MetricsError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

/// Metric definition as submitted by a client, before validation.
///
/// Fields are kept as loose JSON values so that wrongly typed input
/// (a string `order`, a serialised `props`) can be reported precisely
/// instead of failing at deserialisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDraft {
    #[serde(default)]
    pub metric_id: Option<String>,
    #[serde(default, rename = "type")]
    pub metric_type: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub unit: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub order: Option<Value>,
    #[serde(default)]
    pub props: Option<Value>,
}

struct CheckedFields {
    metric_id: Option<String>,
    metric_type: MetricType,
    title: String,
    unit: String,
    description: String,
    status: MetricStatus,
    order: Option<i64>,
    props: Map<String, Value>,
}

impl MetricDraft {
    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), MetricsError> {
        self.check().map(|_| ())
    }

    /// Validates the draft and builds the metric, generating the
    /// identifier and the order when they were not supplied.
    pub fn into_metric(&self, ids: &dyn MetricIdGenerator) -> Result<Metric, MetricsError> {
        let fields = self.check()?;
        Ok(Metric {
            metric_id: fields.metric_id.unwrap_or_else(|| ids.metric_id()),
            metric_type: fields.metric_type,
            title: fields.title,
            unit: fields.unit,
            description: fields.description,
            status: fields.status,
            order: fields.order.unwrap_or_else(|| ids.order()),
            props: fields.props,
            bucket_name: OnceCell::new(),
        })
    }

    fn check(&self) -> Result<CheckedFields, MetricsError> {
        match (
            self.check_metric_id(),
            self.check_type(),
            self.check_title(),
            check_present_string("unit", &self.unit),
            check_present_string("description", &self.description),
            self.check_status(),
            self.check_order(),
            self.check_props(),
        ) {
            (
                Ok(metric_id),
                Ok(metric_type),
                Ok(title),
                Ok(unit),
                Ok(description),
                Ok(status),
                Ok(order),
                Ok(props),
            ) => Ok(CheckedFields {
                metric_id,
                metric_type,
                title,
                unit,
                description,
                status,
                order,
                props,
            }),
            (metric_id, metric_type, title, unit, description, status, order, props) => {
                let errors = [
                    metric_id.err(),
                    metric_type.err(),
                    title.err(),
                    unit.err(),
                    description.err(),
                    status.err(),
                    order.err(),
                    props.err(),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(MetricsError::Invalid(errors))
            }
        }
    }

    fn check_metric_id(&self) -> Result<Option<String>, MetricsError> {
        match &self.metric_id {
            Some(id) if id.is_empty() => Err(MetricsError::metric_not_found(id)),
            other => Ok(other.clone()),
        }
    }

    fn check_type(&self) -> Result<MetricType, MetricsError> {
        match &self.metric_type {
            Some(Value::String(s)) => s.parse().map_err(|_| {
                MetricsError::validation("type", format!("'{}' is not a known monitoring source", s))
            }),
            Some(_) => Err(MetricsError::validation("type", "must be a string")),
            None => Err(MetricsError::validation("type", "is required")),
        }
    }

    fn check_title(&self) -> Result<String, MetricsError> {
        match &self.title {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(MetricsError::validation("title", "must not be empty")),
            Some(_) => Err(MetricsError::validation("title", "must be a string")),
            None => Err(MetricsError::validation("title", "is required")),
        }
    }

    fn check_status(&self) -> Result<MetricStatus, MetricsError> {
        match &self.status {
            Some(Value::String(s)) => s.parse().map_err(|_| {
                MetricsError::validation("status", format!("'{}' is neither visible nor hidden", s))
            }),
            Some(_) => Err(MetricsError::validation("status", "must be a string")),
            None => Err(MetricsError::validation("status", "is required")),
        }
    }

    fn check_order(&self) -> Result<Option<i64>, MetricsError> {
        match &self.order {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| MetricsError::validation("order", "must be an integer")),
            Some(_) => Err(MetricsError::validation("order", "must be an integer")),
        }
    }

    fn check_props(&self) -> Result<Map<String, Value>, MetricsError> {
        match &self.props {
            None => Ok(Map::new()),
            Some(Value::Object(props)) => Ok(props.clone()),
            Some(Value::String(_)) => Err(MetricsError::validation(
                "props",
                "must be a mapping, not a serialised string",
            )),
            Some(_) => Err(MetricsError::validation("props", "must be a mapping")),
        }
    }
}

/// `unit` and `description` may be empty, but must be there.
fn check_present_string(field: &'static str, value: &Option<Value>) -> Result<String, MetricsError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(MetricsError::validation(field, "must be a string")),
        None => Err(MetricsError::validation(field, "must be present")),
    }
}

impl From<&Metric> for MetricDraft {
    fn from(metric: &Metric) -> Self {
        Self {
            metric_id: Some(metric.metric_id.clone()),
            metric_type: Some(Value::String(metric.metric_type.to_string())),
            title: Some(Value::String(metric.title.clone())),
            unit: Some(Value::String(metric.unit.clone())),
            description: Some(Value::String(metric.description.clone())),
            status: Some(Value::String(metric.status.to_string())),
            order: Some(Value::from(metric.order)),
            props: Some(Value::Object(metric.props.clone())),
        }
    }
}
