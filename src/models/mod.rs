use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub mod config;
pub use config::Config;

// ============================================================================
// Raw API shapes
// ============================================================================

/// One row of the earnings calendar endpoint.
///
/// Every field is optional so that rows with gaps survive deserialization and
/// are filtered by the cleaning step instead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEarning {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub eps_estimated: Option<f64>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub revenue_estimated: Option<f64>,
    #[serde(default)]
    pub fiscal_date_ending: Option<String>,
    #[serde(default)]
    pub updated_from_date: Option<String>,
}

/// A daily bar from the `historical` array of the historical price endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalBar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
    pub unadjusted_volume: f64,
    pub change: f64,
    pub change_percent: f64,
    pub change_over_time: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Historical bar tagged with the symbol it was fetched for.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPriceRow {
    pub symbol: String,
    pub bar: HistoricalBar,
}

/// A single point of a technical indicator series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: String,
    pub value: Option<f64>,
}

/// Indicator values collected for one symbol, keyed by indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTechnicalRow {
    pub symbol: String,
    pub values: BTreeMap<Indicator, f64>,
}

// ============================================================================
// Technical indicators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndicatorFunction {
    Sma,
    Ema,
    Rsi,
    Wma,
}

impl IndicatorFunction {
    /// Name used both as the API `type` parameter and as the value key in the response.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorFunction::Sma => "sma",
            IndicatorFunction::Ema => "ema",
            IndicatorFunction::Rsi => "rsi",
            IndicatorFunction::Wma => "wma",
        }
    }
}

/// A `function_period` pair such as `sma_5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Indicator {
    pub function: IndicatorFunction,
    pub period: u32,
}

impl Indicator {
    pub const SMA_5: Indicator = Indicator::new(IndicatorFunction::Sma, 5);
    pub const SMA_10: Indicator = Indicator::new(IndicatorFunction::Sma, 10);
    pub const SMA_20: Indicator = Indicator::new(IndicatorFunction::Sma, 20);
    pub const EMA_5: Indicator = Indicator::new(IndicatorFunction::Ema, 5);
    pub const EMA_10: Indicator = Indicator::new(IndicatorFunction::Ema, 10);
    pub const EMA_20: Indicator = Indicator::new(IndicatorFunction::Ema, 20);
    pub const RSI_14: Indicator = Indicator::new(IndicatorFunction::Rsi, 14);
    pub const WMA_5: Indicator = Indicator::new(IndicatorFunction::Wma, 5);
    pub const WMA_10: Indicator = Indicator::new(IndicatorFunction::Wma, 10);
    pub const WMA_20: Indicator = Indicator::new(IndicatorFunction::Wma, 20);

    pub const fn new(function: IndicatorFunction, period: u32) -> Self {
        Self { function, period }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.function.as_str(), self.period)
    }
}

/// The ten indicators stored in the `technicals` table, in column order.
pub const DAILY_INDICATORS: [Indicator; 10] = [
    Indicator::SMA_5,
    Indicator::SMA_10,
    Indicator::SMA_20,
    Indicator::EMA_5,
    Indicator::EMA_10,
    Indicator::EMA_20,
    Indicator::RSI_14,
    Indicator::WMA_5,
    Indicator::WMA_10,
    Indicator::WMA_20,
];

// ============================================================================
// Table records
// ============================================================================

/// Row of the `earnings` table.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsRecord {
    pub id: String,
    pub earnings_date: String,
    pub symbol: String,
    pub eps: Option<f64>,
    pub eps_estimated: f64,
    pub earnings_time: String,
    /// Stored in the `fiscalDateEnding` column, as received.
    pub fiscal_date_ending: Option<String>,
    /// Stored in the `updatedFromDate` column.
    pub updated_from_date: Option<String>,
}

/// Row of the `pricing` table. `earnings_date` is the run date, not the bar date.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRecord {
    pub id: String,
    pub earnings_date: String,
    pub symbol: String,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub adj_close: f64,
    pub daily_volume: f64,
    pub unadjusted_volume: f64,
    pub change_dollars: f64,
    pub change_percent: f64,
    pub change_over_time: f64,
}

/// Row of the `technicals` table. A `None` column means the indicator had no
/// point at the target date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnicalRecord {
    pub id: String,
    pub earnings_date: String,
    pub symbol: String,
    pub sma_5: Option<f64>,
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_5: Option<f64>,
    pub ema_10: Option<f64>,
    pub ema_20: Option<f64>,
    pub rsi_14: Option<f64>,
    pub wma_5: Option<f64>,
    pub wma_10: Option<f64>,
    pub wma_20: Option<f64>,
}

/// Ordered tickers of the day's earnings reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: Vec<String>,
}

impl SymbolSet {
    /// Keeps first-seen order and drops repeats.
    pub fn from_earnings(records: &[EarningsRecord]) -> Self {
        Self::from_symbols(records.iter().map(|r| r.symbol.clone()))
    }

    pub fn from_symbols<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { symbols }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.symbols
    }
}
