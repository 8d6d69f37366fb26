//! Normalized rate records.
//!
//! All records are built fresh per request and serialized with camelCase
//! field names. Non-finite rates serialize as JSON `null`.

use serde::{Deserialize, Serialize};

/// Quoted rates for one currency against VND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    /// ISO code as supplied upstream (uppercase)
    pub currency_code: String,
    /// Display name, trimmed
    pub currency_name: String,
    /// Cash buying rate
    pub buy: f64,
    /// Transfer buying rate
    pub transfer: f64,
    /// Selling rate
    pub sell: f64,
}

/// One snapshot of the upstream feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSheet {
    /// Upstream timestamp, kept opaque
    pub date_time: String,
    /// Same value as `date_time`; older clients read this field
    pub last_update: String,
    /// Upstream source label
    pub source: String,
    /// Entries in upstream document order
    pub rates: Vec<RateEntry>,
}

impl RateSheet {
    /// Build a sheet, mirroring `date_time` into `last_update`.
    pub fn new(
        date_time: impl Into<String>,
        source: impl Into<String>,
        rates: Vec<RateEntry>,
    ) -> Self {
        let date_time = date_time.into();
        Self {
            last_update: date_time.clone(),
            date_time,
            source: source.into(),
            rates,
        }
    }
}

/// Amount converted at the mid-points of the quoted rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Upstream timestamp of the sheet used
    pub date_time: String,
    /// `((sell + transfer) / 2) * amount`
    pub sell_transfer: f64,
    /// `((sell + buy) / 2) * amount`
    pub sell_buy: f64,
}
