#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use status_metrics::batch::run_collection_schedule;
use status_metrics::catalog::MetricCatalog;
use status_metrics::catalog::catalog_factory::create_catalog_store_from_connection_string;
use status_metrics::clock::SystemClock;
use status_metrics::config::{self, load_configuration};
use status_metrics::datamodel::RandomMetricIdGenerator;
use status_metrics::http::server::run_http_server;
use status_metrics::http::state::HttpServerState;
use status_metrics::monitoring::StaticMonitoringApi;
use status_metrics::series::TimeSeries;
use status_metrics::stack::StaticStackResolver;
use status_metrics::storage::storage_factory::create_object_store_from_connection_string;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    // Initialize Sentry if DSN is provided
    let _sentry = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    info!(
        "Connecting to object store: {}",
        config.object_store_connection_string
    );
    let object_store =
        create_object_store_from_connection_string(&config.object_store_connection_string)
            .await
            .context("Failed to create object store")?;
    let catalog_store =
        create_catalog_store_from_connection_string(&config.catalog_connection_string)
            .context("Failed to create catalog store")?;

    // No monitoring client is bundled: collection rounds find no new datapoints
    warn!("No monitoring service client configured, collection will not fetch datapoints");
    let monitoring = Arc::new(StaticMonitoringApi::new());

    let catalog = MetricCatalog::new(catalog_store, monitoring.clone());
    let series = Arc::new(
        TimeSeries::new(
            object_store,
            Arc::new(StaticStackResolver::new(&config.status_page_bucket_name)),
            monitoring,
            Arc::new(SystemClock),
        )
        .with_max_backfill_days(config.max_backfill_days),
    );

    if config.collect_interval_seconds > 0 {
        info!(
            "Collecting every {} seconds",
            config.collect_interval_seconds
        );
        tokio::spawn(run_collection_schedule(
            catalog.clone(),
            series.clone(),
            config.collect_concurrency,
            Duration::from_secs(config.collect_interval_seconds),
        ));
    }

    // Exit the program if a panic occurs
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(1);
    }));

    let address = SocketAddr::from((config.endpoint, config.port));
    info!("Starting HTTP server on {}", address);
    match run_http_server(
        HttpServerState {
            name: Arc::new("StatusMetrics".to_string()),
            catalog,
            series,
            ids: Arc::new(RandomMetricIdGenerator),
        },
        address,
    )
    .await
    {
        Ok(_) => {
            info!("HTTP server stopped gracefully");
            Ok(())
        }
        Err(err) => {
            error!("HTTP server failed: {}", err);
            Err(err)
        }
    }
}
