//! Fake upstream feed for handler and server tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;

pub const FULL_FEED: &str = include_str!("../../adapter_exrate/tests/fixtures/vcb_full.xml");
pub const SINGLE_FEED: &str = include_str!("../../adapter_exrate/tests/fixtures/vcb_single.xml");

const FEED_PATH: &str = "/Usercontrols/TVPortal.TyGia/pXML.aspx";

/// Local HTTP server answering every feed request with a fixed response
pub struct FakeUpstream {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl FakeUpstream {
    pub async fn spawn(status: StatusCode, body: &'static str) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let app = Router::new().route(
            FEED_PATH,
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, hits, handle }
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, FEED_PATH)
    }

    /// Number of feed requests served so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Feed URL on a local port that was bound and released, so connections are refused
pub fn closed_upstream_url() -> String {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    format!("http://{}{}", addr, FEED_PATH)
}

/// Default configuration pointed at `upstream`
pub fn test_config(upstream: &FakeUpstream) -> ServerConfig {
    ServerConfig {
        upstream_url: upstream.url(),
        ..Default::default()
    }
}
