use crate::series::MAX_BACKFILL_DAYS;
use anyhow::Error;
use confique::Config;
use std::{
    net::IpAddr,
    sync::{Arc, OnceLock},
};

#[derive(Debug, Config)]
pub struct StatusMetricsConfig {
    #[config(env = "STATUS_METRICS_PORT", default = 3000)]
    pub port: u16,
    #[config(env = "STATUS_METRICS_ENDPOINT", default = "127.0.0.1")]
    pub endpoint: IpAddr,

    #[config(env = "STATUS_METRICS_HTTP_BODY_LIMIT", default = "10mb")]
    pub http_body_limit: String,

    #[config(env = "STATUS_METRICS_HTTP_SERVER_TIMEOUT_SECONDS", default = 30)]
    pub http_server_timeout_seconds: u64,

    #[config(
        env = "STATUS_METRICS_OBJECT_STORE_CONNECTION_STRING",
        default = "file://./data"
    )]
    pub object_store_connection_string: String,

    #[config(
        env = "STATUS_METRICS_CATALOG_CONNECTION_STRING",
        default = "file://./metrics.json"
    )]
    pub catalog_connection_string: String,

    #[config(env = "STATUS_METRICS_BUCKET_NAME", default = "status-page")]
    pub status_page_bucket_name: String,

    /// 0 disables the scheduled collection
    #[config(env = "STATUS_METRICS_COLLECT_INTERVAL_SECONDS", default = 300)]
    pub collect_interval_seconds: u64,

    #[config(env = "STATUS_METRICS_COLLECT_CONCURRENCY", default = 4)]
    pub collect_concurrency: usize,

    #[config(env = "STATUS_METRICS_MAX_BACKFILL_DAYS", default = 1)]
    pub max_backfill_days: u32,

    #[config(env = "STATUS_METRICS_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

impl StatusMetricsConfig {
    pub fn load() -> Result<StatusMetricsConfig, Error> {
        let c = StatusMetricsConfig::builder()
            .env()
            .file("settings.toml")
            .load()?;

        if c.max_backfill_days > MAX_BACKFILL_DAYS {
            anyhow::bail!(
                "max_backfill_days must be at most {}, got {}",
                MAX_BACKFILL_DAYS,
                c.max_backfill_days
            );
        }

        Ok(c)
    }

    pub fn parse_http_body_limit(&self) -> Result<usize, Error> {
        let size = byte_unit::Byte::parse_str(self.http_body_limit.clone(), true)?.as_u64();
        if size > 1024 * 1024 * 1024 {
            anyhow::bail!("Body size is too big: > 1GB");
        }
        Ok(size as usize)
    }
}

static STATUS_METRICS_CONFIG: OnceLock<Arc<StatusMetricsConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<StatusMetricsConfig>, Error> {
    STATUS_METRICS_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    // Check if the configuration has already been loaded
    if STATUS_METRICS_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = StatusMetricsConfig::load()?;
    STATUS_METRICS_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_config() {
        let config = StatusMetricsConfig::load().unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.endpoint, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.max_backfill_days, 1);
        assert_eq!(config.status_page_bucket_name, "status-page");
        assert!(config.sentry_dsn.is_none());

        temp_env::with_var("STATUS_METRICS_PORT", Some("8080"), || {
            let config = StatusMetricsConfig::load().unwrap();
            assert_eq!(config.port, 8080);
        });

        temp_env::with_var("STATUS_METRICS_MAX_BACKFILL_DAYS", Some("7"), || {
            let config = StatusMetricsConfig::load().unwrap();
            assert_eq!(config.max_backfill_days, 7);
        });

        temp_env::with_var("STATUS_METRICS_MAX_BACKFILL_DAYS", Some("100000"), || {
            assert!(StatusMetricsConfig::load().is_err());
        });
    }

    #[test]
    #[serial]
    fn test_parse_http_body_limit() {
        let config = StatusMetricsConfig::load().unwrap();
        assert_eq!(config.parse_http_body_limit().unwrap(), 10000000);

        temp_env::with_var("STATUS_METRICS_HTTP_BODY_LIMIT", Some("12345"), || {
            let config = StatusMetricsConfig::load().unwrap();
            assert_eq!(config.parse_http_body_limit().unwrap(), 12345);
        });

        temp_env::with_var("STATUS_METRICS_HTTP_BODY_LIMIT", Some("10MiB"), || {
            let config = StatusMetricsConfig::load().unwrap();
            assert_eq!(config.parse_http_body_limit().unwrap(), 10485760);
        });

        temp_env::with_var("STATUS_METRICS_HTTP_BODY_LIMIT", Some("2gb"), || {
            let config = StatusMetricsConfig::load().unwrap();
            assert!(config.parse_http_body_limit().is_err());
        });

        temp_env::with_var("STATUS_METRICS_HTTP_BODY_LIMIT", Some("-5mb"), || {
            let config = StatusMetricsConfig::load().unwrap();
            assert!(config.parse_http_body_limit().is_err());
        });
    }

    #[test]
    #[serial]
    fn test_load_configuration() {
        load_configuration().unwrap();
        let config = get().unwrap();
        assert_eq!(config.collect_concurrency, 4);
        // Loading twice keeps the first configuration
        load_configuration().unwrap();
    }
}
