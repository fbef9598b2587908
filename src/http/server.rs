use super::app_error::AppError;
use super::datapoints::{collect_metric, get_day_datapoints, insert_datapoints};
use super::health::{liveness, readiness};
use super::metrics::{
    create_metric, get_metric, list_all_metrics, list_external_metrics, list_public_metrics,
    update_metric,
};
use super::state::HttpServerState;
use crate::config;
use crate::http::datapoints::{__path_collect_metric, __path_get_day_datapoints, __path_insert_datapoints};
use crate::http::health::{__path_liveness, __path_readiness};
use crate::http::metrics::{
    __path_create_metric, __path_get_metric, __path_list_all_metrics,
    __path_list_external_metrics, __path_list_public_metrics, __path_update_metric,
};
use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::header;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace;
use tower_http::{ServiceBuilderExt, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "StatusMetrics", description = "Status page metrics API"),
        (name = "Metrics", description = "Metric catalog"),
        (name = "Datapoints", description = "Day-partitioned time series"),
        (name = "Health", description = "Health checks"),
    ),
    paths(frontpage, liveness, readiness,
        list_public_metrics, list_all_metrics, list_external_metrics,
        get_metric, create_metric, update_metric,
        get_day_datapoints, insert_datapoints, collect_metric),
)]
struct ApiDoc;

pub fn build_router(state: HttpServerState, body_limit: usize, timeout_seconds: u64) -> Router {
    let max_body_layer = DefaultBodyLimit::max(body_limit);

    // List of headers that shouldn't be logged
    let sensitive_headers: Arc<[_]> = vec![header::AUTHORIZATION, header::COOKIE].into();

    // Middleware creation
    let middleware = ServiceBuilder::new()
        .sensitive_request_headers(sensitive_headers.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .sensitive_response_headers(sensitive_headers)
        .layer(TimeoutLayer::new(Duration::from_secs(timeout_seconds)))
        .compression()
        .into_inner();

    Router::new()
        .route("/", get(frontpage))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        // Catalog
        .route(
            "/api/v1/metrics",
            get(list_public_metrics).post(create_metric),
        )
        .route("/api/v1/metrics/all", get(list_all_metrics))
        .route("/api/v1/metrics/external", get(list_external_metrics))
        .route(
            "/api/v1/metrics/{metric_id}",
            get(get_metric).put(update_metric),
        )
        // Time series
        .route(
            "/api/v1/metrics/{metric_id}/datapoints/{year}/{month}/{day}",
            get(get_day_datapoints),
        )
        .route(
            "/api/v1/metrics/{metric_id}/collect",
            post(collect_metric),
        )
        .route(
            "/api/v1/datapoints",
            post(insert_datapoints).layer(max_body_layer),
        )
        .layer(middleware)
        .with_state(state)
}

pub async fn run_http_server(state: HttpServerState, address: SocketAddr) -> Result<()> {
    let config = config::get()?;
    let app = build_router(
        state,
        config.parse_http_body_limit()?,
        config.http_server_timeout_seconds,
    );

    // Run our application
    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Wait for the CTRL+C signal
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C handler: {}", err);
        std::future::pending::<()>().await;
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "StatusMetrics",
    responses(
        (status = 200, description = "Service name", body = String)
    )
)]
async fn frontpage(State(state): State<HttpServerState>) -> Result<Json<String>, AppError> {
    let name: String = (*state.name).clone();
    Ok(Json(name))
}
