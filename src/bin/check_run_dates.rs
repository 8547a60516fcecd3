use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;

use earnings_pipeline::utils::MarketCalendar;

/// Show what the daily run would do on each date of a range
#[derive(Parser)]
#[command(name = "check_run_dates")]
#[command(about = "Print the resolved price date, or the reason the run stops, for each day in a range")]
struct Args {
    /// First date (YYYY-MM-DD)
    start: NaiveDate,

    /// Last date (YYYY-MM-DD), defaults to the first
    end: Option<NaiveDate>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let end = args.end.unwrap_or(args.start);
    if end < args.start {
        return Err(anyhow!("end date {} is before start date {}", end, args.start));
    }

    let calendar = MarketCalendar::us_federal();
    println!("🗓️  Run dates from {} to {}", args.start, end);

    let mut day = args.start;
    while day <= end {
        match calendar.resolve(day) {
            Ok(dates) => println!("✅ {} -> prices for {}", day, dates.last_business_day),
            Err(stop) => println!("⏭️  {}", stop),
        }
        day += Duration::days(1);
    }
    Ok(())
}
