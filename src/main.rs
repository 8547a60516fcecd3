use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use earnings_pipeline::api::FmpClient;
use earnings_pipeline::database::DatabaseManager;
use earnings_pipeline::models::config::DEFAULT_PARAMETER_PREFIX;
use earnings_pipeline::models::Config;
use earnings_pipeline::secrets::EnvSecretStore;
use earnings_pipeline::utils::MarketCalendar;
use earnings_pipeline::{run_pipeline, PipelineError, RunOptions, RunSummary};

/// Daily earnings, pricing and technicals loader
#[derive(Parser)]
#[command(name = "earnings-pipeline")]
#[command(version)]
#[command(about = "Pull the day's earnings calendar, prices and technical indicators from FMP into the database")]
#[command(long_about = "
Runs once per business day. Fetches today's earnings reports, keeps the common-stock
rows, then collects the previous business day's price bar and ten daily technical
indicators for every reporting symbol, appending each set to its own table.

Weekends, U.S. holidays and days without earnings end the run with exit code 2.

Examples:
  earnings-pipeline                                   # run for today
  earnings-pipeline --date 2025-09-02                 # run as if it were that day
  earnings-pipeline --database-url sqlite://earnings.db?mode=rwc --skip-technicals
")]
struct Cli {
    /// Run as if today were this date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Prefix under which database credentials and API keys are stored
    #[arg(long, env = "PARAMETER_PREFIX", default_value = DEFAULT_PARAMETER_PREFIX)]
    parameter_prefix: String,

    /// Write to this database instead of the configured MySQL instance
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Only load earnings and pricing
    #[arg(long)]
    skip_technicals: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "earnings_pipeline=debug"
    } else {
        "earnings_pipeline=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let mut config = Config::load(&EnvSecretStore::new(), &cli.parameter_prefix)
        .context("failed to load configuration")?;
    config.apply_env_overrides()?;
    if let Some(url) = cli.database_url {
        config.database_url_override = Some(url);
    }
    info!("📋 Configuration loaded: {:?}", config);

    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let database = DatabaseManager::connect_lazy(&config.database_url()?)
        .context("invalid database URL")?;
    let client = FmpClient::new(&config)?;
    let options = RunOptions {
        include_technicals: !cli.skip_technicals,
    };

    let summary = run_pipeline(
        &client,
        &database,
        &MarketCalendar::us_federal(),
        today,
        &options,
    )
    .await?;
    Ok(summary)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("❌ {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(summary) => {
            info!(
                "📊 {} symbols; pricing skipped for {}, technicals skipped for {}, {} indicator values missing",
                summary.symbols.len(),
                summary.skipped_pricing.len(),
                summary.skipped_technicals.len(),
                summary.missing_indicators.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = exit_code_for(&e);
            if code == NO_WORK_TODAY {
                info!("{}", e);
            } else {
                error!("❌ Run failed: {:#}", e);
            }
            ExitCode::from(code)
        }
    }
}

/// Exit status for weekends, holidays and days without earnings.
const NO_WORK_TODAY: u8 = 2;

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(stop) if stop.is_no_work_today() => NO_WORK_TODAY,
        _ => 1,
    }
}
