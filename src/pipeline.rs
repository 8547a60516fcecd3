use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::api::FinancialDataProvider;
use crate::cleaning::{clean_earnings_data, clean_pricing_data, clean_technical_data};
use crate::data_collector::DataCollector;
use crate::database::{DatabaseManager, InsertOutcome, Table};
use crate::error::PipelineError;
use crate::models::{Indicator, SymbolSet, DAILY_INDICATORS};
use crate::utils::{HolidayCalendar, MarketCalendar, RunDates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub include_technicals: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            include_technicals: true,
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub dates: RunDates,
    pub symbols: Vec<String>,
    pub earnings: InsertOutcome,
    pub pricing: InsertOutcome,
    /// `None` when technicals were not requested.
    pub technicals: Option<InsertOutcome>,
    pub skipped_pricing: Vec<String>,
    pub skipped_technicals: Vec<String>,
    pub missing_indicators: Vec<(String, Indicator)>,
    pub elapsed: Duration,
}

/// One daily run: validate the date, then earnings, pricing and technicals in turn.
///
/// Holidays and weekends end the run before the provider or the database is touched.
pub async fn run_pipeline<P, C>(
    provider: &P,
    db: &DatabaseManager,
    calendar: &MarketCalendar<C>,
    today: NaiveDate,
    options: &RunOptions,
) -> Result<RunSummary, PipelineError>
where
    P: FinancialDataProvider + ?Sized,
    C: HolidayCalendar,
{
    let started = Instant::now();
    let dates = calendar.resolve(today)?;
    let last_day = dates.last_business_day;

    info!("{}: Beginning data pull...", today);
    db.ensure_schema().await?;

    let raw_earnings = provider.earnings_calendar(today, today).await?;
    if raw_earnings.is_empty() {
        return Err(PipelineError::NoEarnings { date: today });
    }
    let earnings = clean_earnings_data(&raw_earnings);
    if earnings.is_empty() {
        return Err(PipelineError::NoEarnings { date: today });
    }
    let earnings_outcome = db.insert_earnings(&earnings).await?;
    log_outcome(today, Table::Earnings, earnings_outcome);

    let symbols = SymbolSet::from_earnings(&earnings);
    info!("Gathering data for {} earnings reports...", symbols.len());

    let collector = DataCollector::new(provider);

    let pricing = collector.collect_pricing(&symbols, last_day).await?;
    let pricing_records = clean_pricing_data(&pricing.rows, today);
    if pricing_records.is_empty() {
        warn!("⚠️ {}: No pricing data for {}", today, last_day);
    }
    let pricing_outcome = db.insert_pricing(&pricing_records).await?;
    log_outcome(today, Table::Pricing, pricing_outcome);

    let mut technicals_outcome = None;
    let mut skipped_technicals = Vec::new();
    let mut missing_indicators = Vec::new();
    if options.include_technicals {
        let technicals = collector
            .collect_technicals(&symbols, &DAILY_INDICATORS, last_day)
            .await?;
        let technical_records = clean_technical_data(&technicals.rows, today);
        if technical_records.is_empty() {
            warn!("⚠️ {}: No technical data for {}", today, last_day);
        }
        let outcome = db.insert_technicals(&technical_records).await?;
        log_outcome(today, Table::Technicals, outcome);

        technicals_outcome = Some(outcome);
        skipped_technicals = technicals.skipped_symbols;
        missing_indicators = technicals.missing;
    }

    let elapsed = started.elapsed();
    info!(
        "{}: Successful execution. Execution time: {:.2?}",
        today, elapsed
    );

    Ok(RunSummary {
        dates,
        symbols: symbols.as_slice().to_vec(),
        earnings: earnings_outcome,
        pricing: pricing_outcome,
        technicals: technicals_outcome,
        skipped_pricing: pricing.skipped,
        skipped_technicals,
        missing_indicators,
        elapsed,
    })
}

fn log_outcome(today: NaiveDate, table: Table, outcome: InsertOutcome) {
    match outcome {
        InsertOutcome::Inserted { rows } => info!("✅ {}: {} rows added to {}", today, rows, table),
        InsertOutcome::AlreadyExists => {
            info!("{}: {} data already exists for today", today, table)
        }
        InsertOutcome::Empty => info!("{}: nothing to add to {}", today, table),
    }
}
