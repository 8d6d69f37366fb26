//! Logging and metrics setup
//!
//! Counters recorded:
//! - `exrate_requests_total{route, outcome}`: outcome is `ok` or an error kind
//! - `exrate_upstream_fetches_total{outcome}`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use adapter_exrate::ExrateError;

use crate::config::Environment;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`. Production emits JSON lines.
pub fn init_tracing(log_level: &str, environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if environment.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Serve Prometheus metrics on `addr` from a background task.
///
/// Must be called from within a tokio runtime.
pub fn install_metrics_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

pub fn record_request(route: &'static str, outcome: &'static str) {
    metrics::counter!("exrate_requests_total", "route" => route, "outcome" => outcome)
        .increment(1);
}

pub fn record_upstream_fetch<T>(result: &Result<T, ExrateError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(error) => error.kind(),
    };
    metrics::counter!("exrate_upstream_fetches_total", "outcome" => outcome).increment(1);
}
