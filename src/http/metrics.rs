use crate::datamodel::{Metric, MetricDraft};
use crate::http::app_error::AppError;
use crate::http::state::HttpServerState;
use crate::monitoring::ExternalMetric;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

/// Metrics shown on the public status page.
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    tag = "Metrics",
    responses(
        (status = 200, description = "Visible metrics", body = Value)
    )
)]
pub async fn list_public_metrics(
    State(state): State<HttpServerState>,
) -> Result<Json<Vec<Metric>>, AppError> {
    Ok(Json(state.catalog.list_public().await?))
}

/// Every catalog metric, hidden ones included.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/all",
    tag = "Metrics",
    responses(
        (status = 200, description = "All metrics", body = Value)
    )
)]
pub async fn list_all_metrics(
    State(state): State<HttpServerState>,
) -> Result<Json<Vec<Metric>>, AppError> {
    Ok(Json(state.catalog.list().await?))
}

/// Metrics known by the monitoring service.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/external",
    tag = "Metrics",
    responses(
        (status = 200, description = "External metrics", body = Vec<ExternalMetric>)
    )
)]
pub async fn list_external_metrics(
    State(state): State<HttpServerState>,
) -> Result<Json<Vec<ExternalMetric>>, AppError> {
    Ok(Json(state.catalog.list_external().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/metrics/{metric_id}",
    tag = "Metrics",
    params(
        ("metric_id" = String, Path, description = "Metric identifier")
    ),
    responses(
        (status = 200, description = "The metric", body = Value),
        (status = 404, description = "Unknown metric")
    )
)]
pub async fn get_metric(
    State(state): State<HttpServerState>,
    Path(metric_id): Path<String>,
) -> Result<Json<Metric>, AppError> {
    Ok(Json(state.catalog.lookup(&metric_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/metrics",
    tag = "Metrics",
    request_body = Value,
    responses(
        (status = 201, description = "Metric created", body = Value),
        (status = 400, description = "Invalid metric"),
        (status = 409, description = "Identifier already taken")
    )
)]
pub async fn create_metric(
    State(state): State<HttpServerState>,
    Json(draft): Json<MetricDraft>,
) -> Result<(StatusCode, Json<Metric>), AppError> {
    let metric = state.catalog.create(&draft, state.ids.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

#[utoipa::path(
    put,
    path = "/api/v1/metrics/{metric_id}",
    tag = "Metrics",
    params(
        ("metric_id" = String, Path, description = "Metric identifier")
    ),
    request_body = Value,
    responses(
        (status = 200, description = "Metric updated", body = Value),
        (status = 400, description = "Invalid metric")
    )
)]
pub async fn update_metric(
    State(state): State<HttpServerState>,
    Path(metric_id): Path<String>,
    Json(mut draft): Json<MetricDraft>,
) -> Result<Json<Metric>, AppError> {
    match draft.metric_id.as_deref() {
        None => draft.metric_id = Some(metric_id),
        Some(id) if id == metric_id => {}
        Some(id) => {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Metric id '{}' in the body does not match '{}' in the path",
                id,
                metric_id
            )));
        }
    }
    Ok(Json(state.catalog.update(&draft, state.ids.as_ref()).await?))
}
