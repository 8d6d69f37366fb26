//! Server startup and binding
//!
//! Provides functionality to start the Axum server with configurable host/port
//! and graceful shutdown on Ctrl-C / SIGTERM.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes;

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server instance with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let config = Arc::new(config);
        let router = routes::build_router(config.clone());

        Self { config, router }
    }

    /// Address string the server will bind to
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind to the configured host/port and serve until shutdown is signalled
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.socket_addr()).await?;
        self.run_with_listener(listener).await
    }

    /// Run the server on an already bound listener
    ///
    /// Useful in tests with a listener bound to port 0.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, upstream = %self.config.upstream_url, "Server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Create a test server and return the bound address
    ///
    /// This binds to port 0 to get a random available port and starts the
    /// server in a background task.
    #[cfg(test)]
    pub async fn spawn_test_server(
        config: ServerConfig,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Self::new(config);
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener).await.ok();
        });

        (addr, handle)
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorMode;
    use crate::test_support::{test_config, FakeUpstream, FULL_FEED};
    use adapter_exrate::{ConversionResult, RateSheet};
    use approx::assert_relative_eq;
    use reqwest::StatusCode;

    #[test]
    fn test_server_socket_addr() {
        let mut config = ServerConfig::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;

        let server = Server::new(config);

        assert_eq!(server.socket_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_server_config_access() {
        let mut config = ServerConfig::default();
        config.port = 9999;

        let server = Server::new(config);

        assert_eq!(server.config().port, 9999);
    }

    #[tokio::test]
    async fn test_server_health_endpoint() {
        let (addr, handle) = Server::spawn_test_server(ServerConfig::default()).await;

        let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "healthy");

        handle.abort();
    }

    #[tokio::test]
    async fn test_end_to_end_rates() {
        let upstream = FakeUpstream::spawn(axum::http::StatusCode::OK, FULL_FEED).await;
        let (addr, handle) = Server::spawn_test_server(test_config(&upstream)).await;
        let client = reqwest::Client::new();

        let sheet: RateSheet = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(sheet.rates.len(), 6);

        let usd: RateSheet = client
            .get(format!("http://{}/USD", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(usd.rates.len(), 1);
        assert_eq!(usd.rates[0].currency_code, "USD");

        let converted: ConversionResult = client
            .get(format!("http://{}/convert/usd/100", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_relative_eq!(converted.sell_transfer, 2_487_500.0);
        assert_relative_eq!(converted.sell_buy, 2_485_000.0);

        handle.abort();
        upstream.shutdown();
    }

    #[tokio::test]
    async fn test_end_to_end_fallback() {
        let upstream = FakeUpstream::spawn(axum::http::StatusCode::OK, "").await;
        let (addr, handle) = Server::spawn_test_server(test_config(&upstream)).await;

        let response = reqwest::get(format!("http://{}/usd", addr)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "Hello Hono!");

        handle.abort();
        upstream.shutdown();
    }

    #[tokio::test]
    async fn test_end_to_end_strict_not_found() {
        let upstream = FakeUpstream::spawn(axum::http::StatusCode::OK, FULL_FEED).await;
        let mut config = test_config(&upstream);
        config.error_mode = ErrorMode::Strict;
        let (addr, handle) = Server::spawn_test_server(config).await;

        let response = reqwest::get(format!("http://{}/xyz", addr)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "currency_not_found");

        handle.abort();
        upstream.shutdown();
    }

    #[tokio::test]
    async fn test_multiple_servers_on_different_ports() {
        let (addr1, handle1) = Server::spawn_test_server(ServerConfig::default()).await;
        let (addr2, handle2) = Server::spawn_test_server(ServerConfig::default()).await;

        assert_ne!(addr1.port(), addr2.port());

        for addr in [addr1, addr2] {
            let response = reqwest::get(format!("http://{}/ready", addr)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        handle1.abort();
        handle2.abort();
    }
}
