//! wiremock helpers for the three FMP endpoints

use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{FMP_CLOUD_KEY, FMP_KEY};

pub async fn mount_earnings(server: &MockServer, day: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v3/earning_calendar"))
        .and(query_param("from", day))
        .and(query_param("to", day))
        .and(query_param("apikey", FMP_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_prices(server: &MockServer, symbol: &str, day: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v3/historical-price-full/{}", symbol)))
        .and(query_param("from", day))
        .and(query_param("to", day))
        .and(query_param("apikey", FMP_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Serve `body` for every indicator request of `symbol`.
pub async fn mount_indicators(server: &MockServer, symbol: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v3/technical_indicator/daily/{}", symbol)))
        .and(query_param("apikey", FMP_CLOUD_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `body` for one indicator of `symbol`. Mount before [`mount_indicators`]
/// so it takes precedence.
pub async fn mount_indicator(
    server: &MockServer,
    symbol: &str,
    function: &str,
    period: u32,
    body: Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v3/technical_indicator/daily/{}", symbol)))
        .and(query_param("type", function))
        .and(query_param("period", period.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}
