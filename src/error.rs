use crate::storage::error::StorageError;
use thiserror::Error;

/// Errors raised by the catalog and time-series operations of a metric.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A metric field violates its constraint
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Lookup matched nothing, or a backing name could not be resolved
    #[error("{kind} not found: '{id}'")]
    NotFound { kind: &'static str, id: String },

    /// The caller tried to create something that already exists
    #[error("{kind} already exists: '{id}'")]
    Conflict { kind: &'static str, id: String },

    /// The catalog returned several metrics for a single identifier
    #[error("Data integrity error: {0}")]
    Integrity(String),

    /// An input timestamp is not a valid instant
    #[error("Invalid timestamp format: '{0}'")]
    Format(String),

    /// Several distinct validation failures
    #[error("Metric is invalid: {}", join_errors(.0))]
    Invalid(Vec<MetricsError>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Monitoring API error: {0}")]
    Monitoring(#[source] anyhow::Error),

    #[error("Stack resolver error: {0}")]
    StackResolver(#[source] anyhow::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[source] anyhow::Error),
}

fn join_errors(errors: &[MetricsError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl MetricsError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        MetricsError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn metric_not_found(metric_id: &str) -> Self {
        MetricsError::NotFound {
            kind: "Metric",
            id: metric_id.to_string(),
        }
    }

    /// True for errors caused by the caller's input rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MetricsError::Validation { .. }
                | MetricsError::Format(_)
                | MetricsError::Invalid(_)
                | MetricsError::Conflict { .. }
        )
    }
}
