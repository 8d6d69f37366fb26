//! Route modules for the exchange-rate server
//!
//! This module contains endpoint group-specific routers:
//! - rates: full sheet, single currency, and conversion endpoints
//! - health: Health check and readiness endpoints

pub mod health;
pub mod rates;

use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use adapter_exrate::client::FeedClient;
use adapter_exrate::{ExrateError, RateSheet};

use crate::config::ServerConfig;
use crate::error::RouteError;
use crate::telemetry;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Upstream feed client
    pub feed: FeedClient,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let feed = FeedClient::new(config.upstream_url.clone());
        Self {
            config,
            feed,
            start_time: std::time::Instant::now(),
        }
    }

    /// Fetch and parse a fresh copy of the upstream feed
    pub async fn fetch_rate_sheet(&self) -> Result<RateSheet, ExrateError> {
        let result = self.feed.fetch_rate_sheet().await;
        telemetry::record_upstream_fetch(&result);
        result
    }

    /// Wrap a handler failure with the configured reporting policy
    pub fn reject(&self, route: &'static str, error: ExrateError) -> RouteError {
        if error.is_upstream() {
            tracing::error!(route, kind = error.kind(), error = %error, "Upstream feed failed");
        } else {
            tracing::warn!(route, kind = error.kind(), error = %error, "Request rejected");
        }
        telemetry::record_request(route, error.kind());

        RouteError {
            error,
            mode: self.config.error_mode,
            fallback_text: self.config.fallback_text.clone(),
        }
    }
}

/// Generates a UUID v4 `x-request-id` for requests that arrive without one
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Build the main application router by merging all route modules
pub fn build_router(config: Arc<ServerConfig>) -> Router {
    let state = AppState::new(config);

    // Static health routes are matched before the `/{currency}` capture
    Router::new()
        .merge(health::routes())
        .merge(rates::routes())
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(RequestUuid))
}
