use crate::batch::insert_batch;
use crate::datamodel::{Datapoint, RawDatapoint};
use crate::http::app_error::AppError;
use crate::http::state::HttpServerState;
use axum::Json;
use axum::extract::{Path, State};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Every datapoint of one metric on one UTC day.
///
/// A day without bucket has no datapoints.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/{metric_id}/datapoints/{year}/{month}/{day}",
    tag = "Datapoints",
    params(
        ("metric_id" = String, Path, description = "Metric identifier"),
        ("year" = i32, Path, description = "UTC year"),
        ("month" = u32, Path, description = "UTC month, 1 to 12"),
        ("day" = u32, Path, description = "UTC day of month")
    ),
    responses(
        (status = 200, description = "Datapoints in ascending order", body = Vec<Datapoint>),
        (status = 400, description = "Invalid date"),
        (status = 404, description = "Unknown metric")
    )
)]
pub async fn get_day_datapoints(
    State(state): State<HttpServerState>,
    Path((metric_id, year, month, day)): Path<(String, i32, u32, u32)>,
) -> Result<Json<Vec<Datapoint>>, AppError> {
    let day = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AppError::bad_request(anyhow::anyhow!(
            "Invalid date: {}-{}-{}",
            year,
            month,
            day
        ))
    })?;
    let metric = state.catalog.lookup(&metric_id).await?;
    let points = state.series.get_datapoints(&metric, day).await?;
    Ok(Json(points.unwrap_or_default()))
}

/// Inserts datapoints for several metrics at once.
///
/// Responds with the merged days of every metric, or with the list of
/// every failed metric when at least one failed.
#[utoipa::path(
    post,
    path = "/api/v1/datapoints",
    tag = "Datapoints",
    request_body = Value,
    responses(
        (status = 200, description = "Merged datapoints per metric", body = Value),
        (status = 400, description = "Errors per metric")
    )
)]
pub async fn insert_datapoints(
    State(state): State<HttpServerState>,
    Json(entries): Json<BTreeMap<String, Vec<RawDatapoint>>>,
) -> Result<Json<BTreeMap<String, Vec<Datapoint>>>, AppError> {
    insert_batch(&state.catalog, &state.series, entries)
        .await
        .map(Json)
        .map_err(AppError::BatchFailed)
}

/// Collects the metric from the monitoring service now.
#[utoipa::path(
    post,
    path = "/api/v1/metrics/{metric_id}/collect",
    tag = "Datapoints",
    params(
        ("metric_id" = String, Path, description = "Metric identifier")
    ),
    responses(
        (status = 200, description = "Merged content of the days touched", body = Vec<Datapoint>),
        (status = 404, description = "Unknown metric")
    )
)]
pub async fn collect_metric(
    State(state): State<HttpServerState>,
    Path(metric_id): Path<String>,
) -> Result<Json<Vec<Datapoint>>, AppError> {
    let metric = state.catalog.lookup(&metric_id).await?;
    Ok(Json(state.series.collect(&metric).await?))
}
