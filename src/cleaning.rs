//! Reshapes raw API rows into the three table records.

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::models::{
    EarningsRecord, Indicator, PricingRecord, RawEarning, RawPriceRow, RawTechnicalRow,
    TechnicalRecord,
};
use crate::utils::{format_table_date, parse_api_date};

/// Tickers this long or longer are not common stock (warrants, units, foreign lines).
pub const MAX_SYMBOL_LEN: usize = 5;

/// `MM/DD/YY-SYMBOL`, the primary key of every table.
pub fn composite_id(date: NaiveDate, symbol: &str) -> String {
    format!("{}-{}", format_table_date(date), symbol)
}

/// Keep rows with a short symbol and every required field, keyed by their own earnings date.
pub fn clean_earnings_data(raw: &[RawEarning]) -> Vec<EarningsRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(raw.len());

    for row in raw {
        let (Some(symbol), Some(date), Some(eps_estimated), Some(time)) = (
            row.symbol.as_deref(),
            row.date.as_deref(),
            row.eps_estimated,
            row.time.as_deref(),
        ) else {
            continue;
        };

        if symbol.chars().count() >= MAX_SYMBOL_LEN {
            continue;
        }

        let Some(earnings_date) = parse_api_date(date) else {
            warn!("⚠️ Dropping {} earnings row with unreadable date {:?}", symbol, date);
            continue;
        };

        let id = composite_id(earnings_date, symbol);
        if !seen.insert(id.clone()) {
            debug!("Duplicate earnings row {}", id);
            continue;
        }

        records.push(EarningsRecord {
            id,
            earnings_date: format_table_date(earnings_date),
            symbol: symbol.to_string(),
            eps: row.eps,
            eps_estimated,
            earnings_time: time.to_string(),
            fiscal_date_ending: row.fiscal_date_ending.clone(),
            updated_from_date: row.updated_from_date.clone(),
        });
    }

    debug!("Kept {} of {} earnings rows", records.len(), raw.len());
    records
}

/// Stamp every bar with the run date. The bar's own date is dropped.
pub fn clean_pricing_data(raw: &[RawPriceRow], today: NaiveDate) -> Vec<PricingRecord> {
    let earnings_date = format_table_date(today);
    let mut seen = HashSet::new();

    raw.iter()
        .filter(|row| seen.insert(row.symbol.clone()))
        .map(|row| {
            let bar = &row.bar;
            PricingRecord {
                id: composite_id(today, &row.symbol),
                earnings_date: earnings_date.clone(),
                symbol: row.symbol.clone(),
                open_price: bar.open,
                high_price: bar.high,
                low_price: bar.low,
                close_price: bar.close,
                adj_close: bar.adj_close,
                daily_volume: bar.volume,
                unadjusted_volume: bar.unadjusted_volume,
                change_dollars: bar.change,
                change_percent: bar.change_percent,
                change_over_time: bar.change_over_time,
            }
        })
        .collect()
}

pub fn clean_technical_data(raw: &[RawTechnicalRow], today: NaiveDate) -> Vec<TechnicalRecord> {
    let earnings_date = format_table_date(today);
    let mut seen = HashSet::new();

    raw.iter()
        .filter(|row| seen.insert(row.symbol.clone()))
        .map(|row| {
            let value = |indicator: Indicator| row.values.get(&indicator).copied();
            TechnicalRecord {
                id: composite_id(today, &row.symbol),
                earnings_date: earnings_date.clone(),
                symbol: row.symbol.clone(),
                sma_5: value(Indicator::SMA_5),
                sma_10: value(Indicator::SMA_10),
                sma_20: value(Indicator::SMA_20),
                ema_5: value(Indicator::EMA_5),
                ema_10: value(Indicator::EMA_10),
                ema_20: value(Indicator::EMA_20),
                rsi_14: value(Indicator::RSI_14),
                wma_5: value(Indicator::WMA_5),
                wma_10: value(Indicator::WMA_10),
                wma_20: value(Indicator::WMA_20),
            }
        })
        .collect()
}
