use super::state::HttpServerState;
use crate::error::MetricsError;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadinessResponse {
    fn ready() -> Self {
        Self {
            status: "ready".to_string(),
            catalog: "ok".to_string(),
            error: None,
        }
    }

    fn catalog_failed(err: &MetricsError) -> Self {
        Self {
            status: "not_ready".to_string(),
            catalog: "error".to_string(),
            error: Some(err.to_string()),
        }
    }
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process answers", body = HealthResponse)
    )
)]
pub async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Ready once the metric catalog can be read.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Catalog readable", body = ReadinessResponse),
        (status = 503, description = "Catalog unavailable", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<HttpServerState>) -> impl IntoResponse {
    let (code, response) = match state.catalog.list().await {
        Ok(_) => (StatusCode::OK, ReadinessResponse::ready()),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ReadinessResponse::catalog_failed(&err),
        ),
    };
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let response = liveness().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_readiness_response_serialization() {
        let json = serde_json::to_string(&ReadinessResponse::ready()).unwrap();
        assert_eq!(json, r#"{"status":"ready","catalog":"ok"}"#);

        let err = MetricsError::Catalog(anyhow::anyhow!("unavailable"));
        let json = serde_json::to_string(&ReadinessResponse::catalog_failed(&err)).unwrap();
        assert_eq!(
            json,
            r#"{"status":"not_ready","catalog":"error","error":"Catalog error: unavailable"}"#
        );
    }
}
