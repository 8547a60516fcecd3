//! FMP response bodies and test configuration

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;

use earnings_pipeline::models::config::DEFAULT_PARAMETER_PREFIX;
use earnings_pipeline::models::Config;

pub const FMP_KEY: &str = "test-fmp-key";
pub const FMP_CLOUD_KEY: &str = "test-cloud-key";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn secrets() -> HashMap<String, String> {
    [
        ("aws-db-name", "earnings"),
        ("aws-key", "secret"),
        ("aws-port", "3306"),
        ("aws-user", "pipeline"),
        ("db-url", "localhost"),
        ("fmp-cloud-key", FMP_CLOUD_KEY),
        ("fmp-key", FMP_KEY),
    ]
    .iter()
    .map(|(k, v)| (format!("{}/{}", DEFAULT_PARAMETER_PREFIX, k), v.to_string()))
    .collect()
}

/// Config pointed at a mock server, with pacing off.
pub fn config_for(base_uri: &str, database_url: &str) -> Config {
    let mut config =
        Config::load(&secrets(), DEFAULT_PARAMETER_PREFIX).expect("Failed to load test config");
    let api = format!("{}/api/v3", base_uri);
    config.fmp_base_url = api.parse().unwrap();
    config.fmp_cloud_base_url = api.parse().unwrap();
    config.rate_limit_per_minute = 0;
    config.http_timeout_secs = 5;
    config.database_url_override = Some(database_url.to_string());
    config
}

pub fn earning(date: &str, symbol: &str, eps_estimated: Option<f64>) -> Value {
    json!({
        "date": date,
        "symbol": symbol,
        "eps": null,
        "epsEstimated": eps_estimated,
        "time": "amc",
        "revenue": null,
        "revenueEstimated": 1_250_000_000.0,
        "fiscalDateEnding": "2025-07-31",
        "updatedFromDate": "2025-09-01"
    })
}

pub fn price_history(symbol: &str, date: &str, close: f64) -> Value {
    json!({
        "symbol": symbol,
        "historical": [{
            "date": date,
            "open": close - 1.25,
            "high": close + 2.0,
            "low": close - 3.0,
            "close": close,
            "adjClose": close,
            "volume": 48_900_000.0,
            "unadjustedVolume": 48_900_000.0,
            "change": 1.25,
            "changePercent": 0.54,
            "vwap": close,
            "label": "August 29, 25",
            "changeOverTime": 0.0054
        }]
    })
}

/// A two-day indicator series carrying every function key, so one body
/// answers any indicator request.
pub fn indicator_series(latest: &str, previous: &str, value: f64) -> Value {
    json!([
        {
            "date": format!("{} 00:00:00", latest),
            "open": value, "high": value, "low": value, "close": value, "volume": 1000,
            "sma": value, "ema": value + 0.5, "rsi": 55.5, "wma": value + 0.25
        },
        {
            "date": format!("{} 00:00:00", previous),
            "open": value, "high": value, "low": value, "close": value, "volume": 1000,
            "sma": value - 1.0, "ema": value - 0.5, "rsi": 52.0, "wma": value - 0.75
        }
    ])
}
