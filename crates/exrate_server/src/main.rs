//! Exchange-rate proxy server
//!
//! REST API over the Vietcombank exchange-rate feed.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use exrate_server::config::{build_config, CliArgs as ConfigCliArgs};
use exrate_server::server::Server;
use exrate_server::telemetry;

/// Exchange-rate proxy - JSON API over the Vietcombank XML feed
#[derive(Parser, Debug)]
#[command(name = "exrate_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "EXRATE_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "EXRATE_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "EXRATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Upstream exchange-rate XML feed URL
    #[arg(long, env = "EXRATE_UPSTREAM_URL")]
    upstream_url: Option<String>,

    /// Failure reporting mode (compat, strict)
    #[arg(long, env = "EXRATE_ERROR_MODE")]
    error_mode: Option<String>,

    /// Port for the Prometheus metrics exporter
    #[arg(long, env = "EXRATE_METRICS_PORT")]
    metrics_port: Option<u16>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            upstream_url: args.upstream_url,
            error_mode: args.error_mode,
            metrics_port: args.metrics_port,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    telemetry::init_tracing(config.log_level.as_filter_str(), config.environment);

    tracing::info!("Exrate Server v{}", exrate_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        environment = %config.environment,
        upstream_url = %config.upstream_url,
        error_mode = %config.error_mode,
        "Server configuration loaded"
    );

    if let Some(metrics_port) = config.metrics_port {
        let addr: SocketAddr = format!("{}:{}", config.host, metrics_port)
            .parse()
            .with_context(|| format!("invalid metrics address {}:{}", config.host, metrics_port))?;
        telemetry::install_metrics_exporter(addr).context("failed to start metrics exporter")?;
        tracing::info!(%addr, "Metrics exporter listening");
    }

    let server = Server::new(config);
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server.run().await?;

    Ok(())
}
