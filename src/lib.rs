pub mod api;
pub mod cleaning;
pub mod data_collector;
pub mod database;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod secrets;
pub mod utils;

pub use error::{ApiError, ConfigError, FetchError, PipelineError};
pub use pipeline::{run_pipeline, RunOptions, RunSummary};
