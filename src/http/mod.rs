pub mod app_error;
pub mod datapoints;
pub mod health;
pub mod metrics;
pub mod server;
pub mod state;
