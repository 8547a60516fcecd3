use sqlx::any::{install_default_drivers, AnyArguments, AnyPoolOptions};
use sqlx::query::Query;
use sqlx::{Any, AnyPool};
use std::fmt;
use tracing::{debug, info, warn};

use crate::models::{EarningsRecord, PricingRecord, TechnicalRecord};

/// The three append-only tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Earnings,
    Pricing,
    Technicals,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Earnings => "earnings",
            Table::Pricing => "pricing",
            Table::Technicals => "technicals",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of appending one table's batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted { rows: usize },
    /// A row with the same id was already stored; nothing from the batch was kept.
    AlreadyExists,
    /// Nothing to insert.
    Empty,
}

/// A record that maps onto one row of a table.
trait TableRow {
    const TABLE: Table;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;
    fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>>;
}

impl TableRow for EarningsRecord {
    const TABLE: Table = Table::Earnings;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "earnings_date",
        "symbol",
        "eps",
        "eps_estimated",
        "earnings_time",
        "fiscalDateEnding",
        "updatedFromDate",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        query
            .bind(self.id.as_str())
            .bind(self.earnings_date.as_str())
            .bind(self.symbol.as_str())
            .bind(self.eps)
            .bind(self.eps_estimated)
            .bind(self.earnings_time.as_str())
            .bind(self.fiscal_date_ending.as_deref())
            .bind(self.updated_from_date.as_deref())
    }
}

impl TableRow for PricingRecord {
    const TABLE: Table = Table::Pricing;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "earnings_date",
        "symbol",
        "open_price",
        "high_price",
        "low_price",
        "close_price",
        "adj_close",
        "daily_volume",
        "unadjusted_volume",
        "change_dollars",
        "change_percent",
        "change_over_time",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        query
            .bind(self.id.as_str())
            .bind(self.earnings_date.as_str())
            .bind(self.symbol.as_str())
            .bind(self.open_price)
            .bind(self.high_price)
            .bind(self.low_price)
            .bind(self.close_price)
            .bind(self.adj_close)
            .bind(self.daily_volume)
            .bind(self.unadjusted_volume)
            .bind(self.change_dollars)
            .bind(self.change_percent)
            .bind(self.change_over_time)
    }
}

impl TableRow for TechnicalRecord {
    const TABLE: Table = Table::Technicals;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "earnings_date",
        "symbol",
        "sma_5",
        "sma_10",
        "sma_20",
        "ema_5",
        "ema_10",
        "ema_20",
        "rsi_14",
        "wma_5",
        "wma_10",
        "wma_20",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values<'q>(
        &'q self,
        query: Query<'q, Any, AnyArguments<'q>>,
    ) -> Query<'q, Any, AnyArguments<'q>> {
        query
            .bind(self.id.as_str())
            .bind(self.earnings_date.as_str())
            .bind(self.symbol.as_str())
            .bind(self.sma_5)
            .bind(self.sma_10)
            .bind(self.sma_20)
            .bind(self.ema_5)
            .bind(self.ema_10)
            .bind(self.ema_20)
            .bind(self.rsi_14)
            .bind(self.wma_5)
            .bind(self.wma_10)
            .bind(self.wma_20)
    }
}

const CREATE_EARNINGS: &str = "CREATE TABLE IF NOT EXISTS earnings (
    id VARCHAR(32) PRIMARY KEY,
    earnings_date VARCHAR(8) NOT NULL,
    symbol VARCHAR(8) NOT NULL,
    eps DOUBLE,
    eps_estimated DOUBLE NOT NULL,
    earnings_time VARCHAR(16) NOT NULL,
    fiscalDateEnding VARCHAR(10),
    updatedFromDate VARCHAR(10)
)";

const CREATE_PRICING: &str = "CREATE TABLE IF NOT EXISTS pricing (
    id VARCHAR(32) PRIMARY KEY,
    earnings_date VARCHAR(8) NOT NULL,
    symbol VARCHAR(8) NOT NULL,
    open_price DOUBLE NOT NULL,
    high_price DOUBLE NOT NULL,
    low_price DOUBLE NOT NULL,
    close_price DOUBLE NOT NULL,
    adj_close DOUBLE NOT NULL,
    daily_volume DOUBLE NOT NULL,
    unadjusted_volume DOUBLE NOT NULL,
    change_dollars DOUBLE NOT NULL,
    change_percent DOUBLE NOT NULL,
    change_over_time DOUBLE NOT NULL
)";

const CREATE_TECHNICALS: &str = "CREATE TABLE IF NOT EXISTS technicals (
    id VARCHAR(32) PRIMARY KEY,
    earnings_date VARCHAR(8) NOT NULL,
    symbol VARCHAR(8) NOT NULL,
    sma_5 DOUBLE,
    sma_10 DOUBLE,
    sma_20 DOUBLE,
    ema_5 DOUBLE,
    ema_10 DOUBLE,
    ema_20 DOUBLE,
    rsi_14 DOUBLE,
    wma_5 DOUBLE,
    wma_10 DOUBLE,
    wma_20 DOUBLE
)";

/// Append-only writer for the earnings, pricing and technicals tables.
///
/// Works against MySQL in production and SQLite locally through the `Any` driver.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: AnyPool,
}

impl DatabaseManager {
    /// Build the pool without opening a connection.
    pub fn connect_lazy(database_url: &str) -> Result<Self, sqlx::Error> {
        install_default_drivers();
        let pool = pool_options().connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        install_default_drivers();
        let pool = pool_options().connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Create the three tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        for ddl in [CREATE_EARNINGS, CREATE_PRICING, CREATE_TECHNICALS] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        debug!("Schema ready");
        Ok(())
    }

    pub async fn insert_earnings(
        &self,
        records: &[EarningsRecord],
    ) -> Result<InsertOutcome, sqlx::Error> {
        self.append_rows(records).await
    }

    pub async fn insert_pricing(
        &self,
        records: &[PricingRecord],
    ) -> Result<InsertOutcome, sqlx::Error> {
        self.append_rows(records).await
    }

    pub async fn insert_technicals(
        &self,
        records: &[TechnicalRecord],
    ) -> Result<InsertOutcome, sqlx::Error> {
        self.append_rows(records).await
    }

    /// Insert the whole batch in one transaction.
    ///
    /// A duplicate id rolls the batch back and is reported as `AlreadyExists`;
    /// any other database error is returned.
    async fn append_rows<R: TableRow>(&self, records: &[R]) -> Result<InsertOutcome, sqlx::Error> {
        let table = R::TABLE;
        if records.is_empty() {
            return Ok(InsertOutcome::Empty);
        }

        let sql = insert_statement(table, R::COLUMNS);
        let mut tx = self.pool.begin().await?;

        for record in records {
            let result = record
                .bind_values(sqlx::query(&sql))
                .execute(&mut *tx)
                .await;

            match result {
                Ok(_) => {}
                Err(e) if is_duplicate_key(&e) => {
                    tx.rollback().await?;
                    warn!(
                        "⚠️ {}: id {} already exists, nothing inserted ({})",
                        table,
                        record.id(),
                        e
                    );
                    return Ok(InsertOutcome::AlreadyExists);
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;
        info!("💾 {}: inserted {} rows", table, records.len());
        Ok(InsertOutcome::Inserted {
            rows: records.len(),
        })
    }
}

fn pool_options() -> AnyPoolOptions {
    AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

fn insert_statement(table: Table, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    )
}

/// Whether `err` is a primary key / unique constraint conflict.
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
