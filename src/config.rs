use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env` if present)
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// MySQL connection string; the in-memory backend is used when unset
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Upper bound on every storage call, also the pool acquire timeout
    pub op_timeout: Duration,
    pub history_page_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            database_url: None,
            max_connections: 5,
            op_timeout: Duration::from_millis(5000),
            history_page_size: 10,
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LedgerConfig::default();

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = match lookup("LEDGER_MAX_CONNECTIONS") {
            Some(raw) => parse_positive("LEDGER_MAX_CONNECTIONS", &raw)? as u32,
            None => defaults.max_connections,
        };

        let op_timeout = match lookup("LEDGER_OP_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_positive("LEDGER_OP_TIMEOUT_MS", &raw)?),
            None => defaults.op_timeout,
        };

        let history_page_size = match lookup("LEDGER_HISTORY_PAGE_SIZE") {
            Some(raw) => parse_positive("LEDGER_HISTORY_PAGE_SIZE", &raw)? as usize,
            None => defaults.history_page_size,
        };

        Ok(LedgerConfig {
            database_url,
            max_connections,
            op_timeout,
            history_page_size,
        })
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 && value <= u32::MAX as u64 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        }),
    }
}
