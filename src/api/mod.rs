use async_trait::async_trait;
use chrono::NaiveDate;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

use crate::error::{ApiError, FetchError};
use crate::models::{HistoricalBar, Indicator, IndicatorPoint, RawEarning};

pub mod fmp_client;
pub use fmp_client::FmpClient;

/// Paces outgoing requests evenly at the configured rate.
///
/// A rate of zero disables pacing.
pub struct ApiRateLimiter {
    limiter: Option<DefaultDirectRateLimiter>,
}

impl ApiRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_minute).map(|rate| {
            RateLimiter::direct(Quota::per_minute(rate).allow_burst(NonZeroU32::MIN))
        });

        Self { limiter }
    }

    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

/// The three endpoints the pipeline reads from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    /// Earnings reports scheduled between `from` and `to`, inclusive.
    async fn earnings_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawEarning>, ApiError>;

    /// Daily bars for `symbol` between `from` and `to`.
    ///
    /// An empty or partial response is reported as [`FetchError::MissingData`].
    async fn price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalBar>, FetchError>;

    /// Full daily series of one indicator for `symbol`.
    async fn technical_indicator(
        &self,
        symbol: &str,
        indicator: Indicator,
    ) -> Result<Vec<IndicatorPoint>, FetchError>;
}
