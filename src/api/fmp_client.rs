use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ApiError, FetchError};
use crate::models::{Config, HistoricalBar, Indicator, IndicatorPoint, RawEarning};
use super::{ApiRateLimiter, FinancialDataProvider};

/// Financial Modeling Prep client.
///
/// Earnings and prices come from the main FMP host, technical indicators from
/// fmpcloud.io; each host has its own key, passed as the `apikey` query parameter.
pub struct FmpClient {
    client: Client,
    fmp_base_url: Url,
    fmp_cloud_base_url: Url,
    fmp_api_key: String,
    fmp_cloud_api_key: String,
    rate_limiter: ApiRateLimiter,
}

impl FmpClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent("earnings-pipeline/0.1")
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            fmp_base_url: config.fmp_base_url.clone(),
            fmp_cloud_base_url: config.fmp_cloud_base_url.clone(),
            fmp_api_key: config.fmp_api_key.clone(),
            fmp_cloud_api_key: config.fmp_cloud_api_key.clone(),
            rate_limiter: ApiRateLimiter::new(config.rate_limit_per_minute),
        })
    }

    /// GET `url` and parse the body as JSON.
    ///
    /// An `{"Error Message": ...}` body (bad key, exhausted plan) is a rejection,
    /// whatever the status code.
    pub async fn fetch_json(&self, url: Url) -> Result<Value, ApiError> {
        let path = url.path().to_string();

        self.rate_limiter.wait().await;
        debug!("GET {}", path);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                path: path.clone(),
                source: e.without_url(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            path: path.clone(),
            source: e.without_url(),
        })?;

        let parsed: Result<Value, serde_json::Error> = serde_json::from_str(&body);
        if let Some(message) = parsed
            .as_ref()
            .ok()
            .and_then(|v| v.get("Error Message"))
            .and_then(Value::as_str)
        {
            return Err(ApiError::Rejected {
                path,
                message: message.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                path,
                status: status.as_u16(),
                body,
            });
        }

        let value = parsed.map_err(|source| ApiError::Json {
            path: path.clone(),
            source,
        })?;
        debug!("{} answered with {} bytes", path, body.len());
        Ok(value)
    }

    fn fmp_url(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        endpoint(&self.fmp_base_url, segments, query, &self.fmp_api_key)
    }

    fn fmp_cloud_url(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        endpoint(&self.fmp_cloud_base_url, segments, query, &self.fmp_cloud_api_key)
    }
}

fn endpoint(base: &Url, segments: &[&str], query: &[(&str, String)], api_key: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("apikey", api_key);
    }
    url
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl FinancialDataProvider for FmpClient {
    async fn earnings_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawEarning>, ApiError> {
        let url = self.fmp_url(&["earning_calendar"], &[("from", iso(from)), ("to", iso(to))]);
        let path = url.path().to_string();
        let data = self.fetch_json(url).await?;

        let earnings: Vec<RawEarning> =
            serde_json::from_value(data).map_err(|source| ApiError::Json { path, source })?;
        debug!("Retrieved {} earnings rows for {} to {}", earnings.len(), from, to);
        Ok(earnings)
    }

    async fn price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalBar>, FetchError> {
        let url = self.fmp_url(
            &["historical-price-full", symbol],
            &[("from", iso(from)), ("to", iso(to))],
        );
        let data = self.fetch_json(url).await?;

        let historical = data
            .get("historical")
            .cloned()
            .ok_or_else(|| FetchError::missing(symbol, "response has no 'historical' field"))?;
        let bars: Vec<HistoricalBar> = serde_json::from_value(historical)
            .map_err(|e| FetchError::missing(symbol, e.to_string()))?;

        debug!("Retrieved {} price bars for {} from {} to {}", bars.len(), symbol, from, to);
        Ok(bars)
    }

    async fn technical_indicator(
        &self,
        symbol: &str,
        indicator: Indicator,
    ) -> Result<Vec<IndicatorPoint>, FetchError> {
        let function = indicator.function.as_str();
        let url = self.fmp_cloud_url(
            &["technical_indicator", "daily", symbol],
            &[("period", indicator.period.to_string()), ("type", function.to_string())],
        );
        let data = self.fetch_json(url).await?;

        let series = data
            .as_array()
            .ok_or_else(|| FetchError::missing(symbol, format!("{} is not a series", indicator)))?;

        let points = series
            .iter()
            .filter_map(|point| {
                let date = point.get("date")?.as_str()?;
                Some(IndicatorPoint {
                    date: date.to_string(),
                    value: point.get(function).and_then(Value::as_f64),
                })
            })
            .collect();
        Ok(points)
    }
}
