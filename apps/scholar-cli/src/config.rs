//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: a missing required variable or an unparsable value
//! stops the CLI before anything touches the database or Engage.

use scholar_engage::{EngageConfig, DEFAULT_BASE_URL};
use scholar_jobs::JobQueueConfig;
use scholar_sync::SyncConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Database used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://scholar.db";

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Everything the CLI needs to wire the services together.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub engage: EngageConfig,
    pub sync: SyncConfig,
    /// Marksheet columns of the school calendar, in order.
    pub importances: Vec<String>,
    pub jobs: JobQueueConfig,
    pub rust_log: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Required Variables
    ///
    /// - `ENGAGE_TOKEN` - bearer credential for Engage
    ///
    /// # Optional Variables
    ///
    /// - `DATABASE_URL` - SQLite URL (default: `sqlite://scholar.db`)
    /// - `ENGAGE_BASE_URL` - report comment service URL
    /// - `ENGAGE_TIMEOUT_SECS` - request timeout, `0` disables it (default: 30)
    /// - `SYNC_PACING_MS` - wait between Engage calls of a refresh (default: 2000)
    /// - `SYNC_STUDENT_FALLBACK` / `SYNC_MARK_FALLBACK` - store what lookups
    ///   fetch from Engage (default: true)
    /// - `CURRENT_ACADEMIC_YEAR` - default derived from today's date
    /// - `PERIOD_IMPORTANCES` - comma-separated columns (default: `Test,Exam`)
    /// - `JOB_HEARTBEAT_SECS` - keep-alive interval of job feeds (default: 5)
    /// - `RUST_LOG` - log filter (default: `info`)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("ENGAGE_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("ENGAGE_TOKEN".to_string()))?;

        let mut engage = EngageConfig::new(token).with_base_url(
            lookup("ENGAGE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        );
        if let Some(secs) = parse_var::<u64>(&lookup, "ENGAGE_TIMEOUT_SECS")? {
            engage.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        let mut sync = SyncConfig::default();
        if let Some(ms) = parse_var::<u64>(&lookup, "SYNC_PACING_MS")? {
            sync.pacing_interval = Duration::from_millis(ms);
        }
        if let Some(enabled) = parse_flag(&lookup, "SYNC_STUDENT_FALLBACK")? {
            sync.student_fallback = enabled;
        }
        if let Some(enabled) = parse_flag(&lookup, "SYNC_MARK_FALLBACK")? {
            sync.mark_fallback = enabled;
        }
        if let Some(year) = parse_var::<i32>(&lookup, "CURRENT_ACADEMIC_YEAR")? {
            sync.current_academic_year = year;
        }

        let importances = match lookup("PERIOD_IMPORTANCES") {
            Some(list) => {
                let importances: Vec<String> = list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if importances.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        var: "PERIOD_IMPORTANCES".to_string(),
                        message: "must list at least one column".to_string(),
                    });
                }
                importances
            }
            None => scholar_core::calendar::DEFAULT_IMPORTANCES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        };

        let mut jobs = JobQueueConfig::default();
        if let Some(secs) = parse_var::<u64>(&lookup, "JOB_HEARTBEAT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "JOB_HEARTBEAT_SECS".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            jobs.heartbeat_interval = Duration::from_secs(secs);
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            engage,
            sync,
            importances,
            jobs,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                var: var.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<bool>, ConfigError> {
    lookup(var)
        .map(|raw| match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                var: var.to_string(),
                message: format!("expected a boolean, got {other:?}"),
            }),
        })
        .transpose()
}
