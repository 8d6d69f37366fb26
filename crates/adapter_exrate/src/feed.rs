//! `ExrateList` document mapping.
//!
//! Second stage of the feed parser: maps the generic field tree onto a
//! [`RateSheet`] with explicit field contracts.
//!
//! Expected upstream shape (attributes and elements are interchangeable):
//!
//! ```text
//! ExrateList
//! ├── DateTime   text
//! ├── Source     text
//! └── Exrate     one or many
//!     ├── CurrencyCode, CurrencyName
//!     └── Buy, Transfer, Sell   "24,850.00" | "-"
//! ```

use crate::error::ExrateError;
use crate::models::{RateEntry, RateSheet};
use crate::xml::{self, XmlNode, XmlValue};

/// Upstream text meaning "no rate quoted"
pub const PLACEHOLDER: &str = "-";

const ROOT: &str = "ExrateList";
const DATE_TIME: &str = "DateTime";
const SOURCE: &str = "Source";
const EXRATE: &str = "Exrate";

/// Parse raw upstream text into a [`RateSheet`].
///
/// # Errors
///
/// [`ExrateError::MalformedFeed`] when the text is not XML or lacks the
/// `ExrateList` structure (error pages, empty bodies).
pub fn parse_rate_sheet(raw: &str) -> Result<RateSheet, ExrateError> {
    let document = xml::parse_document(raw)?;
    rate_sheet_from_document(&document)
}

/// Map a parsed document onto a [`RateSheet`].
pub fn rate_sheet_from_document(document: &XmlNode) -> Result<RateSheet, ExrateError> {
    let root = document
        .get(ROOT)
        .and_then(XmlValue::as_node)
        .ok_or_else(|| ExrateError::malformed(format!("missing <{}> root element", ROOT)))?;

    let date_time = required_text(root, DATE_TIME)?;
    let source = required_text(root, SOURCE)?;

    let rates = root
        .get(EXRATE)
        .ok_or_else(|| ExrateError::malformed(format!("no <{}> entries", EXRATE)))?
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| rate_entry_from_value(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(rates = rates.len(), date_time, "Parsed rate sheet");

    Ok(RateSheet::new(date_time, source, rates))
}

fn rate_entry_from_value(index: usize, item: &XmlValue) -> Result<RateEntry, ExrateError> {
    let node = item.as_node().ok_or_else(|| {
        ExrateError::malformed(format!("<{}> entry {} has no fields", EXRATE, index))
    })?;

    let field = |name: &'static str| entry_field(node, index, name);

    Ok(RateEntry {
        currency_code: field("CurrencyCode")?.to_string(),
        currency_name: field("CurrencyName")?.trim().to_string(),
        buy: parse_rate(field("Buy")?),
        transfer: parse_rate(field("Transfer")?),
        sell: parse_rate(field("Sell")?),
    })
}

fn entry_field<'a>(node: &'a XmlNode, index: usize, name: &str) -> Result<&'a str, ExrateError> {
    node.text_field(name).ok_or_else(|| {
        ExrateError::malformed(format!(
            "<{}> entry {} is missing {}",
            EXRATE, index, name
        ))
    })
}

// Every response carries `dateTime`, `lastUpdate` and `source`; a sheet
// without them is rejected rather than served with the keys missing.
fn required_text<'a>(node: &'a XmlNode, name: &str) -> Result<&'a str, ExrateError> {
    node.text_field(name)
        .ok_or_else(|| ExrateError::malformed(format!("missing <{}> field", name)))
}

/// Parse a locale-formatted rate.
///
/// The placeholder `"-"` is `0`. Otherwise thousands separators are removed
/// and the longest leading decimal number is taken, so `"24,850.00"` is
/// `24850.0` and `"12.5 VND"` is `12.5`. Text with no leading number is
/// `NaN` rather than an error; it serializes as `null`.
///
/// # Examples
///
/// ```
/// use adapter_exrate::feed::parse_rate;
///
/// assert_eq!(parse_rate("24,850.00"), 24850.0);
/// assert_eq!(parse_rate("-"), 0.0);
/// assert!(parse_rate("n/a").is_nan());
/// ```
pub fn parse_rate(raw: &str) -> f64 {
    if raw == PLACEHOLDER {
        return 0.0;
    }

    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim_start();

    match decimal_prefix_len(cleaned) {
        0 => f64::NAN,
        len => cleaned[..len].parse().unwrap_or(f64::NAN),
    }
}

/// Length of the longest prefix of `s` that is a decimal literal:
/// `[+-]? digits? ('.' digits?)? ([eE] [+-]? digits)?` with at least one
/// mantissa digit. Returns 0 when there is none.
fn decimal_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    end
}
