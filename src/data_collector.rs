use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::api::FinancialDataProvider;
use crate::error::{ApiError, FetchError};
use crate::models::{Indicator, IndicatorPoint, RawPriceRow, RawTechnicalRow, SymbolSet};
use crate::utils::parse_api_date;

/// Price bars gathered for the day, plus the symbols that had none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingCollection {
    pub rows: Vec<RawPriceRow>,
    pub skipped: Vec<String>,
}

/// Indicator values gathered for the day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnicalCollection {
    pub rows: Vec<RawTechnicalRow>,
    /// Single (symbol, indicator) values with no point at the target date.
    pub missing: Vec<(String, Indicator)>,
    /// Symbols for which no indicator had a value; they produce no row.
    pub skipped_symbols: Vec<String>,
}

/// Per-symbol fan-out over the data provider.
///
/// Calls are issued one at a time, in symbol order. Gaps in the upstream data
/// are skipped and logged; API failures end the collection.
pub struct DataCollector<'a, P: FinancialDataProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: FinancialDataProvider + ?Sized> DataCollector<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Fetch the `last_day` bar for every symbol.
    pub async fn collect_pricing(
        &self,
        symbols: &SymbolSet,
        last_day: NaiveDate,
    ) -> Result<PricingCollection, ApiError> {
        let mut collection = PricingCollection::default();

        for symbol in symbols.iter() {
            let bars = match self.provider.price_history(symbol, last_day, last_day).await {
                Ok(bars) => bars,
                Err(FetchError::MissingData { reason, .. }) => {
                    warn!("⚠️ Skipping symbol: {} has no pricing for {} ({})", symbol, last_day, reason);
                    collection.skipped.push(symbol.to_string());
                    continue;
                }
                Err(FetchError::Api(e)) => return Err(e),
            };

            let bar = bars
                .iter()
                .find(|bar| parse_api_date(&bar.date) == Some(last_day))
                .cloned();

            match bar {
                Some(bar) => {
                    debug!("{} closed at {:.2} on {}", symbol, bar.close, bar.date);
                    collection.rows.push(RawPriceRow {
                        symbol: symbol.to_string(),
                        bar,
                    });
                }
                None => {
                    warn!(
                        "⚠️ Skipping symbol: {} returned {} bars, none for {}",
                        symbol,
                        bars.len(),
                        last_day
                    );
                    collection.skipped.push(symbol.to_string());
                }
            }
        }

        info!(
            "📈 Pricing collected for {}/{} symbols",
            collection.rows.len(),
            symbols.len()
        );
        Ok(collection)
    }

    /// Fetch each indicator series for every symbol and keep the value at `last_day`.
    pub async fn collect_technicals(
        &self,
        symbols: &SymbolSet,
        indicators: &[Indicator],
        last_day: NaiveDate,
    ) -> Result<TechnicalCollection, ApiError> {
        let mut collection = TechnicalCollection::default();

        for symbol in symbols.iter() {
            let mut values = BTreeMap::new();

            for &indicator in indicators {
                let value = match self.provider.technical_indicator(symbol, indicator).await {
                    Ok(points) => select_value_at(&points, last_day),
                    Err(FetchError::MissingData { reason, .. }) => {
                        debug!("{} {}: {}", symbol, indicator, reason);
                        None
                    }
                    Err(FetchError::Api(e)) => return Err(e),
                };

                match value {
                    Some(value) => {
                        values.insert(indicator, value);
                    }
                    None => {
                        warn!("⚠️ Skipping value: {} has no {} for {}", symbol, indicator, last_day);
                        collection.missing.push((symbol.to_string(), indicator));
                    }
                }
            }

            if values.is_empty() {
                warn!("⚠️ Skipping symbol: no technicals for {}", symbol);
                collection.skipped_symbols.push(symbol.to_string());
                continue;
            }

            collection.rows.push(RawTechnicalRow {
                symbol: symbol.to_string(),
                values,
            });
        }

        info!(
            "📊 Technicals collected for {}/{} symbols ({} values missing)",
            collection.rows.len(),
            symbols.len(),
            collection.missing.len()
        );
        Ok(collection)
    }
}

/// Value of the series at `date`, if the series has a non-null point there.
pub fn select_value_at(points: &[IndicatorPoint], date: NaiveDate) -> Option<f64> {
    points
        .iter()
        .find(|point| parse_api_date(&point.date) == Some(date))
        .and_then(|point| point.value)
}
