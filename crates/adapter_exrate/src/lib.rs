//! # adapter_exrate
//!
//! Adapter for the upstream foreign-exchange-rate XML feed.
//!
//! ## Architecture Position
//!
//! **A**dapter layer of the A-I-P-S architecture. Feeds raw upstream data
//! into typed records consumed by the service layer (`exrate_server`).
//!
//! ## Pipeline
//!
//! 1. [`client::FeedClient`] fetches the raw XML text (one GET, no retries)
//! 2. [`xml::parse_document`] turns the text into a generic field tree
//! 3. [`feed::rate_sheet_from_document`] maps the tree onto a [`RateSheet`]
//! 4. [`query`] derives the per-request views (all rates, one currency, conversion)
//!
//! ## Example
//!
//! ```rust,ignore
//! use adapter_exrate::{client::FeedClient, query};
//!
//! let client = FeedClient::new(adapter_exrate::DEFAULT_UPSTREAM_URL);
//! let sheet = client.fetch_rate_sheet().await?;
//! let usd = query::get_rate_by_currency(sheet, "usd")?;
//! ```

pub mod client;
pub mod feed;
pub mod models;
pub mod query;
pub mod xml;

mod error;

pub use error::ExrateError;
pub use models::{ConversionResult, RateEntry, RateSheet};

/// Vietcombank exchange-rate XML endpoint
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://portal.vietcombank.com.vn/Usercontrols/TVPortal.TyGia/pXML.aspx";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::FeedClient;
    pub use crate::feed::{parse_rate, parse_rate_sheet};
    pub use crate::query::*;
    pub use crate::{ConversionResult, ExrateError, RateEntry, RateSheet};
}
