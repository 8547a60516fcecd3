use chrono::NaiveDate;
use thiserror::Error;

/// Failures talking to the financial data API.
///
/// None of these are retried; they abort the run.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {body}")]
    Status { path: String, status: u16, body: String },

    #[error("{path} rejected the request: {message}")]
    Rejected { path: String, message: String },

    #[error("malformed JSON from {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of a per-symbol fetch that did not produce data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Expected gap in the upstream data; the caller skips and continues.
    #[error("no data for {symbol}: {reason}")]
    MissingData { symbol: String, reason: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FetchError {
    pub fn missing(symbol: &str, reason: impl Into<String>) -> Self {
        FetchError::MissingData {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required parameter {name} is not set")]
    MissingSecret { name: String },

    #[error("parameter {name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Everything that can end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{date}: U.S. holiday. Exiting program.")]
    Holiday { date: NaiveDate },

    #[error("{date}: No data available on the weekend")]
    Weekend { date: NaiveDate },

    #[error("{date}: no non-holiday business day found within {limit} steps back from {start}")]
    HolidayWalkExhausted {
        date: NaiveDate,
        start: NaiveDate,
        limit: usize,
    },

    #[error("{date}: No earnings available")]
    NoEarnings { date: NaiveDate },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PipelineError {
    /// Expected "nothing to do today" outcomes, as opposed to crashes.
    pub fn is_no_work_today(&self) -> bool {
        matches!(
            self,
            PipelineError::Holiday { .. }
                | PipelineError::Weekend { .. }
                | PipelineError::NoEarnings { .. }
        )
    }
}
