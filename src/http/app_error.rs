use crate::batch::BatchError;
use crate::error::MetricsError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;
use tracing::error;

// Anyhow error handling with axum
// https://github.com/tokio-rs/axum/blob/d3112a40d55f123bc5e65f995e2068e245f12055/examples/anyhow-error-response/src/main.rs
#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    BadRequest(anyhow::Error),
    NotFound(anyhow::Error),
    Conflict(anyhow::Error),
    /// Every failed entry of a batch
    BatchFailed(Vec<BatchError>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InternalServerError(error) => {
                error!("Internal Server Error: {:#}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            AppError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, json!({ "error": error.to_string() }))
            }
            AppError::NotFound(error) => {
                (StatusCode::NOT_FOUND, json!({ "error": error.to_string() }))
            }
            AppError::Conflict(error) => {
                (StatusCode::CONFLICT, json!({ "error": error.to_string() }))
            }
            AppError::BatchFailed(errors) => {
                let errors: Vec<_> = errors
                    .iter()
                    .map(|e| json!({ "metricId": e.metric_id, "error": e.error.to_string() }))
                    .collect();
                (StatusCode::BAD_REQUEST, json!({ "errors": errors }))
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<MetricsError> for AppError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::NotFound { .. } => Self::NotFound(err.into()),
            MetricsError::Conflict { .. } => Self::Conflict(err.into()),
            err if err.is_client_error() => Self::BadRequest(err.into()),
            err => Self::InternalServerError(err.into()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl AppError {
    pub fn bad_request(err: impl Into<anyhow::Error>) -> Self {
        Self::BadRequest(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_error_status_codes() {
        let cases = [
            (MetricsError::metric_not_found("a"), StatusCode::NOT_FOUND),
            (MetricsError::Format("x".to_string()), StatusCode::BAD_REQUEST),
            (
                MetricsError::validation("title", "must not be empty"),
                StatusCode::BAD_REQUEST,
            ),
            (
                MetricsError::Conflict {
                    kind: "Metric",
                    id: "a".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                MetricsError::Integrity("dup".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                MetricsError::Monitoring(anyhow::anyhow!("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            let response = AppError::from(error).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_batch_failed_is_bad_request() {
        let response = AppError::BatchFailed(vec![BatchError {
            metric_id: "a".to_string(),
            error: MetricsError::metric_not_found("a"),
        }])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
