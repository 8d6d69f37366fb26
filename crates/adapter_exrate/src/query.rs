//! Derived views over a [`RateSheet`].
//!
//! Pure functions of (sheet, request parameters). Currency codes are matched
//! case-insensitively against the stored upstream code.

use crate::error::ExrateError;
use crate::models::{ConversionResult, RateEntry, RateSheet};

/// Full sheet, unchanged.
pub fn get_all_rates(sheet: RateSheet) -> RateSheet {
    sheet
}

/// First entry whose code matches `code`, ignoring case.
pub fn find_rate<'a>(sheet: &'a RateSheet, code: &str) -> Result<&'a RateEntry, ExrateError> {
    let wanted = code.to_lowercase();
    sheet
        .rates
        .iter()
        .find(|rate| rate.currency_code.to_lowercase() == wanted)
        .ok_or_else(|| ExrateError::currency_not_found(code))
}

/// Sheet metadata with `rates` narrowed to the single matching entry.
pub fn get_rate_by_currency(sheet: RateSheet, code: &str) -> Result<RateSheet, ExrateError> {
    let rate = find_rate(&sheet, code)?.clone();
    Ok(RateSheet {
        rates: vec![rate],
        ..sheet
    })
}

/// Parse a requested amount.
///
/// Surrounding whitespace is ignored and an empty string is `0`. Anything
/// else must be a complete decimal number.
///
/// # Examples
///
/// ```
/// use adapter_exrate::query::parse_amount;
///
/// assert_eq!(parse_amount("100").unwrap(), 100.0);
/// assert_eq!(parse_amount(" ").unwrap(), 0.0);
/// assert!(parse_amount("ten").is_err());
/// ```
pub fn parse_amount(raw: &str) -> Result<f64, ExrateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|amount| !amount.is_nan())
        .ok_or_else(|| ExrateError::invalid_amount(raw))
}

/// Convert `amount` at the mid-points of the currency's quoted rates.
///
/// A `NaN` amount is carried through to both results.
pub fn convert_amount(
    sheet: &RateSheet,
    code: &str,
    amount: f64,
) -> Result<ConversionResult, ExrateError> {
    let rate = find_rate(sheet, code)?;

    Ok(ConversionResult {
        date_time: sheet.date_time.clone(),
        sell_transfer: ((rate.sell + rate.transfer) / 2.0) * amount,
        sell_buy: ((rate.sell + rate.buy) / 2.0) * amount,
    })
}
