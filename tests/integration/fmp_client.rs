//! FmpClient against a mock FMP server

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use earnings_pipeline::api::{FinancialDataProvider, FmpClient};
use earnings_pipeline::error::{ApiError, FetchError};
use earnings_pipeline::models::Indicator;

use crate::common::{api_mock, fixtures, logging};
use crate::common::fixtures::date;

fn client_for(server: &MockServer) -> FmpClient {
    let config = fixtures::config_for(&server.uri(), "sqlite::memory:");
    FmpClient::new(&config).expect("Failed to build client")
}

#[test_log::test(tokio::test)]
async fn test_earnings_calendar_sends_dates_and_key() {
    logging::log_test_step("Earnings calendar request");
    let server = MockServer::start().await;
    api_mock::mount_earnings(
        &server,
        "2025-09-02",
        json!([fixtures::earning("2025-09-02", "AAPL", Some(1.43))]),
    )
    .await;

    let rows = client_for(&server)
        .earnings_calendar(date(2025, 9, 2), date(2025, 9, 2))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].symbol.as_deref(), Some("AAPL"));
    assert_eq!(rows[0].eps_estimated, Some(1.43));
}

#[test_log::test(tokio::test)]
async fn test_price_history_without_historical_is_missing_data() {
    let server = MockServer::start().await;
    api_mock::mount_prices(&server, "MSFT", "2025-08-29", json!({})).await;

    let result = client_for(&server)
        .price_history("MSFT", date(2025, 8, 29), date(2025, 8, 29))
        .await;

    assert_matches!(result, Err(FetchError::MissingData { symbol, .. }) if symbol == "MSFT");
}

#[test_log::test(tokio::test)]
async fn test_technical_indicator_reads_function_key() {
    let server = MockServer::start().await;
    api_mock::mount_indicator(
        &server,
        "AAPL",
        "rsi",
        14,
        fixtures::indicator_series("2025-08-29", "2025-08-28", 230.0),
    )
    .await;

    let points = client_for(&server)
        .technical_indicator("AAPL", Indicator::RSI_14)
        .await
        .unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, "2025-08-29 00:00:00");
    assert_eq!(points[0].value, Some(55.5));
}

#[test_log::test(tokio::test)]
async fn test_technical_indicator_object_body_is_missing_data() {
    let server = MockServer::start().await;
    api_mock::mount_indicators(&server, "NEWCO", json!({})).await;

    let result = client_for(&server)
        .technical_indicator("NEWCO", Indicator::SMA_5)
        .await;

    assert_matches!(result, Err(FetchError::MissingData { .. }));
}

#[test_log::test(tokio::test)]
async fn test_error_message_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/earning_calendar"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "Error Message": "Invalid API KEY. Please retry or visit our documentation."
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .earnings_calendar(date(2025, 9, 2), date(2025, 9, 2))
        .await;

    assert_matches!(result, Err(ApiError::Rejected { message, .. }) if message.starts_with("Invalid API KEY"));
}

#[test_log::test(tokio::test)]
async fn test_server_error_and_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/historical-price-full/AAPL"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/earning_calendar"))
        .and(query_param("from", "2025-09-02"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[{\"symbol\":"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let prices = client
        .price_history("AAPL", date(2025, 8, 29), date(2025, 8, 29))
        .await;
    assert_matches!(
        prices,
        Err(FetchError::Api(ApiError::Status { status: 503, .. }))
    );

    let earnings = client
        .earnings_calendar(date(2025, 9, 2), date(2025, 9, 2))
        .await;
    assert_matches!(earnings, Err(ApiError::Json { .. }));
}

#[test_log::test(tokio::test)]
async fn test_api_key_is_not_in_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .earnings_calendar(date(2025, 9, 2), date(2025, 9, 2))
        .await
        .unwrap_err();

    assert!(!err.to_string().contains(fixtures::FMP_KEY));
}
