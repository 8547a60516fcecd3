use std::fmt;
use url::Url;

use crate::error::ConfigError;
use crate::secrets::SecretStore;

pub const DEFAULT_PARAMETER_PREFIX: &str = "/rds-pipelines/dev";
pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
pub const DEFAULT_FMP_CLOUD_BASE_URL: &str = "https://fmpcloud.io/api/v3";

/// Configuration for the pipeline, loaded once before any network activity.
#[derive(Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub fmp_api_key: String,
    pub fmp_cloud_api_key: String,
    pub fmp_base_url: Url,
    pub fmp_cloud_base_url: Url,
    pub rate_limit_per_minute: u32,
    pub http_timeout_secs: u64,
    /// Replaces the MySQL URL assembled from the db_* fields, e.g. a local SQLite file.
    pub database_url_override: Option<String>,
}

impl Config {
    /// Resolve every required secret under `prefix`. Fails on the first missing one.
    pub fn load(secrets: &dyn SecretStore, prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.trim_end_matches('/');
        let secret = |key: &str| secrets.fetch_secret(&format!("{}/{}", prefix, key));

        let port_name = format!("{}/aws-port", prefix);
        let port_raw = secret("aws-port")?;
        let db_port: u16 = port_raw
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                name: port_name,
                value: port_raw.clone(),
                reason: e.to_string(),
            })?;

        Ok(Config {
            db_name: secret("aws-db-name")?,
            db_password: secret("aws-key")?,
            db_port,
            db_user: secret("aws-user")?,
            db_host: secret("db-url")?,
            fmp_cloud_api_key: secret("fmp-cloud-key")?,
            fmp_api_key: secret("fmp-key")?,
            fmp_base_url: Url::parse(DEFAULT_FMP_BASE_URL)?,
            fmp_cloud_base_url: Url::parse(DEFAULT_FMP_CLOUD_BASE_URL)?,
            rate_limit_per_minute: 300,
            http_timeout_secs: 30,
            database_url_override: None,
        })
    }

    /// Apply the non-secret tunables from environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("FMP_BASE_URL") {
            self.fmp_base_url = Url::parse(&url)?;
        }
        if let Ok(url) = std::env::var("FMP_CLOUD_BASE_URL") {
            self.fmp_cloud_base_url = Url::parse(&url)?;
        }
        if let Ok(value) = std::env::var("RATE_LIMIT_PER_MINUTE") {
            self.rate_limit_per_minute = parse_env("RATE_LIMIT_PER_MINUTE", &value)?;
        }
        if let Ok(value) = std::env::var("HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_env("HTTP_TIMEOUT_SECS", &value)?;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database_url_override = Some(url);
            }
        }
        Ok(())
    }

    /// Connection URL for the sink: the override if set, otherwise MySQL with
    /// percent-encoded credentials.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.database_url_override {
            return Ok(url.clone());
        }

        let mut url = Url::parse("mysql://localhost")?;
        url.set_host(Some(&self.db_host))?;
        url.set_port(Some(self.db_port))
            .map_err(|_| self.invalid_db_field("port", &self.db_port.to_string()))?;
        url.set_username(&self.db_user)
            .map_err(|_| self.invalid_db_field("user", &self.db_user))?;
        url.set_password(Some(&self.db_password))
            .map_err(|_| self.invalid_db_field("password", "<redacted>"))?;
        url.set_path(&format!("/{}", self.db_name));
        url.query_pairs_mut().append_pair("charset", "utf8mb4");
        Ok(url.to_string())
    }

    fn invalid_db_field(&self, field: &str, value: &str) -> ConfigError {
        ConfigError::InvalidValue {
            name: format!("database {}", field),
            value: value.to_string(),
            reason: format!("cannot be used with host {}", self.db_host),
        }
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_password", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("fmp_api_key", &"<redacted>")
            .field("fmp_cloud_api_key", &"<redacted>")
            .field("fmp_base_url", &self.fmp_base_url.as_str())
            .field("fmp_cloud_base_url", &self.fmp_cloud_base_url.as_str())
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("database_url_override", &self.database_url_override.is_some())
            .finish()
    }
}
