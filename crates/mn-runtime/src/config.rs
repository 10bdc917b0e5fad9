//! Runtime configuration from environment variables.

use mn_01_entity_resolution::NotFoundPolicy;
use mn_02_contract_results::ReconcilerConfig;
use shared_types::HapiVersion;
use std::env;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that does not parse.
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        /// Environment variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Configuration of the ingestion runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Reconciler switches.
    pub reconciler: ReconcilerConfig,

    /// Ingestion worker threads
    pub workers: usize,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerConfig::default(),
            workers: 4,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MN_PERSIST_CONTRACT_RESULTS`: Emit contract results (default: true)
    /// - `MN_PERSIST_CONTRACTS`: Synthesize child contracts (default: true)
    /// - `MN_CREATED_CONTRACT_IDS_MAX_VERSION`: Child contract version gate (default: 0.23.0)
    /// - `MN_NOT_FOUND_POLICY`: `error`, `fallthrough` or `skip` (default: fallthrough)
    /// - `MN_WORKERS`: Ingestion worker threads (default: 4)
    /// - `MN_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MN_JSON_LOGS`: Enable JSON logs (default: false)
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for any variable that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`RuntimeConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for any variable that does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut reconciler = defaults.reconciler;

        if let Some(value) = lookup("MN_PERSIST_CONTRACT_RESULTS") {
            reconciler.persist_contract_results = parse_bool("MN_PERSIST_CONTRACT_RESULTS", &value)?;
        }
        if let Some(value) = lookup("MN_PERSIST_CONTRACTS") {
            reconciler.persist_contracts = parse_bool("MN_PERSIST_CONTRACTS", &value)?;
        }
        if let Some(value) = lookup("MN_CREATED_CONTRACT_IDS_MAX_VERSION") {
            reconciler.created_contract_ids_max_version = value
                .parse::<HapiVersion>()
                .map_err(|e| {
                    ConfigError::invalid("MN_CREATED_CONTRACT_IDS_MAX_VERSION", &value, e.to_string())
                })?;
        }
        if let Some(value) = lookup("MN_NOT_FOUND_POLICY") {
            reconciler.not_found_policy = value
                .parse::<NotFoundPolicy>()
                .map_err(|e| ConfigError::invalid("MN_NOT_FOUND_POLICY", &value, e))?;
        }

        let workers = match lookup("MN_WORKERS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => workers,
                _ => return Err(ConfigError::invalid("MN_WORKERS", &value, "expected a positive integer")),
            },
            None => defaults.workers,
        };

        let log_level = lookup("MN_LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or(defaults.log_level);

        let json_logs = match lookup("MN_JSON_LOGS") {
            Some(value) => parse_bool("MN_JSON_LOGS", &value)?,
            None => defaults.json_logs,
        };

        Ok(Self {
            reconciler,
            workers,
            log_level,
            json_logs,
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(var, value, "expected true or false")),
    }
}
