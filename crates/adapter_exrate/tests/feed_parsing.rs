//! Integration tests for the feed parser and rate queries.
//!
//! Runs the full text → tree → sheet → query pipeline against captured
//! upstream documents.

use adapter_exrate::feed::{parse_rate, parse_rate_sheet};
use adapter_exrate::prelude::*;
use adapter_exrate::xml::{parse_document, XmlValue};
use approx::assert_relative_eq;
use proptest::prelude::*;

const FULL_FEED: &str = include_str!("fixtures/vcb_full.xml");
const SINGLE_FEED: &str = include_str!("fixtures/vcb_single.xml");
const ERROR_PAGE: &str = include_str!("fixtures/error_page.html");

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_full_feed_keeps_document_order() {
    let sheet = parse_rate_sheet(FULL_FEED).unwrap();
    let codes: Vec<_> = sheet
        .rates
        .iter()
        .map(|rate| rate.currency_code.as_str())
        .collect();

    assert_eq!(codes, vec!["AUD", "CAD", "EUR", "JPY", "KWD", "USD"]);
    assert_eq!(sheet.date_time, "10/18/2026 8:00:00 AM");
    assert_eq!(
        sheet.source,
        "Joint Stock Commercial Bank for Foreign Trade of Vietnam - Vietcombank"
    );
}

#[test]
fn test_full_feed_values() {
    let sheet = parse_rate_sheet(FULL_FEED).unwrap();

    let jpy = find_rate(&sheet, "JPY").unwrap();
    assert_eq!(jpy.currency_name, "JAPANESE YEN");
    assert_relative_eq!(jpy.buy, 161.02);
    assert_relative_eq!(jpy.transfer, 162.65);
    assert_relative_eq!(jpy.sell, 170.42);

    let kwd = find_rate(&sheet, "KWD").unwrap();
    assert_eq!(kwd.buy, 0.0);
    assert_relative_eq!(kwd.sell, 85778.20);
}

#[test]
fn test_single_entry_feed_is_wrapped() {
    let document = parse_document(SINGLE_FEED).unwrap();
    let root = document.get("ExrateList").and_then(XmlValue::as_node).unwrap();
    assert!(matches!(root.get("Exrate"), Some(XmlValue::Node(_))));

    let sheet = parse_rate_sheet(SINGLE_FEED).unwrap();
    assert_eq!(sheet.rates.len(), 1);
    assert_eq!(sheet.rates[0].currency_code, "USD");
}

#[test]
fn test_error_page_is_malformed() {
    let err = parse_rate_sheet(ERROR_PAGE).unwrap_err();
    assert_eq!(err.kind(), "malformed_feed");
}

#[test]
fn test_empty_body_is_malformed() {
    for body in ["", "   \n", "Service Unavailable"] {
        let err = parse_rate_sheet(body).unwrap_err();
        assert_eq!(err.kind(), "malformed_feed", "body {body:?}");
    }
}

#[test]
fn test_truncated_feed_is_malformed() {
    let truncated = &FULL_FEED[..FULL_FEED.len() / 2];
    assert!(parse_rate_sheet(truncated).is_err());
}

// ============================================================================
// Queries over a parsed feed
// ============================================================================

#[test]
fn test_lookup_is_case_insensitive() {
    let lower = get_rate_by_currency(parse_rate_sheet(FULL_FEED).unwrap(), "usd").unwrap();
    let upper = get_rate_by_currency(parse_rate_sheet(FULL_FEED).unwrap(), "USD").unwrap();

    assert_eq!(lower, upper);
    assert_eq!(lower.rates.len(), 1);
}

#[test]
fn test_convert_usd_fixture() {
    let sheet = parse_rate_sheet(FULL_FEED).unwrap();
    let result = convert_amount(&sheet, "usd", parse_amount("100").unwrap()).unwrap();

    assert_relative_eq!(result.sell_transfer, 2_487_500.0);
    assert_relative_eq!(result.sell_buy, 2_485_000.0);
    assert_eq!(result.date_time, sheet.date_time);
}

#[test]
fn test_sheet_json_shape() {
    let sheet = get_rate_by_currency(parse_rate_sheet(FULL_FEED).unwrap(), "eur").unwrap();
    let json = serde_json::to_value(&sheet).unwrap();

    assert_eq!(json["dateTime"], "10/18/2026 8:00:00 AM");
    assert_eq!(json["lastUpdate"], "10/18/2026 8:00:00 AM");
    assert_eq!(json["rates"][0]["currencyCode"], "EUR");
    assert_eq!(json["rates"][0]["currencyName"], "EURO");
    assert_eq!(json["rates"][0]["sell"], 27886.26);
}

// ============================================================================
// Number-format properties
// ============================================================================

/// Format an integer with comma thousands separators.
fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

proptest! {
    #[test]
    fn prop_thousands_separators_are_ignored(whole in 0u64..10_000_000_000, cents in 0u32..100) {
        let raw = format!("{}.{:02}", with_thousands(whole), cents);
        let plain = format!("{}.{:02}", whole, cents);
        prop_assert_eq!(parse_rate(&raw), plain.parse::<f64>().unwrap());
    }

    #[test]
    fn prop_single_entry_always_yields_one_rate(
        code in "[A-Z]{3}",
        sell in 0u64..1_000_000,
    ) {
        let xml = format!(
            r#"<ExrateList><DateTime>t</DateTime><Source>s</Source><Exrate CurrencyCode="{code}" CurrencyName="N" Buy="-" Transfer="-" Sell="{}"/></ExrateList>"#,
            with_thousands(sell)
        );
        let sheet = parse_rate_sheet(&xml).unwrap();
        prop_assert_eq!(sheet.rates.len(), 1);
        prop_assert_eq!(sheet.rates[0].buy, 0.0);
        prop_assert_eq!(sheet.rates[0].sell, sell as f64);
    }

    #[test]
    fn prop_entry_count_matches_document(count in 1usize..20) {
        let entries: String = (0..count)
            .map(|i| format!(r#"<Exrate CurrencyCode="C{i:02}" CurrencyName="N" Buy="1" Transfer="2" Sell="3"/>"#))
            .collect();
        let xml = format!("<ExrateList><DateTime>t</DateTime><Source>s</Source>{entries}</ExrateList>");

        let sheet = parse_rate_sheet(&xml).unwrap();
        prop_assert_eq!(sheet.rates.len(), count);
        for (i, rate) in sheet.rates.iter().enumerate() {
            prop_assert_eq!(&rate.currency_code, &format!("C{i:02}"));
        }
    }
}
