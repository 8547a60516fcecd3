//! Transformers fed with FMP-shaped payloads

use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;

use earnings_pipeline::cleaning::{clean_earnings_data, clean_pricing_data, composite_id};
use earnings_pipeline::models::{HistoricalBar, RawEarning, RawPriceRow, SymbolSet};

use crate::common::fixtures::{date, earning, price_history};

#[test_log::test]
fn test_composite_ids_are_unique_across_dates_and_symbols() {
    let symbols = ["A", "AA", "AAP", "AAPL", "ZS", "Z"];
    let mut ids = HashSet::new();
    let mut day = date(2024, 1, 1);

    while day < date(2026, 1, 1) {
        for symbol in symbols {
            assert!(ids.insert(composite_id(day, symbol)), "{} {}", day, symbol);
        }
        day += Duration::days(1);
    }
}

#[test_log::test]
fn test_earnings_calendar_payload() {
    let payload = json!([
        earning("2025-09-02", "AAPL", Some(1.43)),
        earning("2025-09-02", "BRK.A123456", Some(2.0)),
        earning("2025-09-02", "ZS", None),
        earning("2025-09-02", "ZS", Some(0.80)),
        {"date": "2025-09-02", "symbol": "HPE", "epsEstimated": 0.43, "time": null},
    ]);
    let raw: Vec<RawEarning> = serde_json::from_value(payload).unwrap();

    let records = clean_earnings_data(&raw);
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();

    assert_eq!(ids, vec!["09/02/25-AAPL", "09/02/25-ZS"]);
    assert_eq!(records[1].eps_estimated, 0.80);
    assert_eq!(records[1].fiscal_date_ending.as_deref(), Some("2025-07-31"));

    let symbols = SymbolSet::from_earnings(&records);
    assert_eq!(symbols.as_slice(), &["AAPL".to_string(), "ZS".to_string()]);
}

#[test_log::test]
fn test_price_payload_is_stamped_with_run_date() {
    let body = price_history("AAPL", "2025-08-29", 232.14);
    let bars: Vec<HistoricalBar> = serde_json::from_value(body["historical"].clone()).unwrap();
    let raw = vec![RawPriceRow {
        symbol: "AAPL".into(),
        bar: bars[0].clone(),
    }];

    let records = clean_pricing_data(&raw, date(2025, 9, 2));

    assert_eq!(records[0].id, "09/02/25-AAPL");
    assert_eq!(records[0].earnings_date, "09/02/25");
    assert_eq!(records[0].adj_close, 232.14);
    assert_eq!(records[0].change_over_time, 0.0054);
}
