//! Named secret lookup.
//!
//! Deployments keep database credentials and API keys in a parameter store
//! under a path prefix such as `/rds-pipelines/dev`. Locally the same names are
//! resolved from environment variables (optionally loaded from `.env`).

use std::collections::HashMap;

use crate::error::ConfigError;

pub trait SecretStore {
    fn fetch_secret(&self, name: &str) -> Result<String, ConfigError>;
}

/// Resolves parameter names from the process environment.
///
/// `/rds-pipelines/dev/aws-db-name` is read from `RDS_PIPELINES_DEV_AWS_DB_NAME`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    pub fn env_var_name(parameter: &str) -> String {
        parameter
            .trim_start_matches('/')
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl SecretStore for EnvSecretStore {
    fn fetch_secret(&self, name: &str) -> Result<String, ConfigError> {
        let var = Self::env_var_name(name);
        match std::env::var(&var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingSecret {
                name: format!("{} (env {})", name, var),
            }),
        }
    }
}

impl SecretStore for HashMap<String, String> {
    fn fetch_secret(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name).cloned().ok_or_else(|| ConfigError::MissingSecret {
            name: name.to_string(),
        })
    }
}
