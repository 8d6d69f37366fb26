//! REST proxy for the Vietcombank exchange-rate feed
//!
//! This crate exposes the upstream XML feed as JSON: the full rate sheet,
//! a single-currency lookup, and an amount conversion. Each request fetches
//! and parses the feed afresh via [`adapter_exrate`].

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use adapter_exrate;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
