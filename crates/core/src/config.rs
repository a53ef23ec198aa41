//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables. Binaries read the raw
//! environment values; the parsing helpers here turn them into typed settings.

use crate::constants::{
    DEFAULT_AUDIT_DIR, DEFAULT_AUDIT_MAX_ATTEMPTS, DEFAULT_AUDIT_QUEUE_CAPACITY,
    DEFAULT_AUDIT_RETRY_BACKOFF_MS, DEFAULT_AUDIT_WRITE_TIMEOUT_MS, DEFAULT_CATALOG_PATH,
    DEFAULT_CATALOG_TIMEOUT_MS,
};
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tunables of the write-behind diagnosis log writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditOptions {
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub write_timeout: Duration,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_AUDIT_QUEUE_CAPACITY,
            max_attempts: DEFAULT_AUDIT_MAX_ATTEMPTS,
            retry_backoff: Duration::from_millis(DEFAULT_AUDIT_RETRY_BACKOFF_MS),
            write_timeout: Duration::from_millis(DEFAULT_AUDIT_WRITE_TIMEOUT_MS),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    catalog_path: PathBuf,
    audit_dir: PathBuf,
    catalog_timeout: Duration,
    audit: AuditOptions,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            audit_dir: PathBuf::from(DEFAULT_AUDIT_DIR),
            catalog_timeout: Duration::from_millis(DEFAULT_CATALOG_TIMEOUT_MS),
            audit: AuditOptions::default(),
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the catalog timeout is zero, the audit queue has
    /// no capacity, or audit records would get zero write attempts.
    pub fn new(
        catalog_path: PathBuf,
        audit_dir: PathBuf,
        catalog_timeout: Duration,
        audit: AuditOptions,
    ) -> ConfigResult<Self> {
        if catalog_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "catalog_timeout",
                reason: "must be greater than zero".into(),
            });
        }
        if audit.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "audit.queue_capacity",
                reason: "must be greater than zero".into(),
            });
        }
        if audit.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "audit.max_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if audit.write_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "audit.write_timeout",
                reason: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            catalog_path,
            audit_dir,
            catalog_timeout,
            audit,
        })
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn audit_dir(&self) -> &Path {
        &self.audit_dir
    }

    pub fn catalog_timeout(&self) -> Duration {
        self.catalog_timeout
    }

    pub fn audit(&self) -> &AuditOptions {
        &self.audit
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a millisecond duration from an optional environment value.
///
/// `None` or a blank value yields `default_ms`.
pub fn duration_ms_from_env_value(
    name: &'static str,
    value: Option<String>,
    default_ms: u64,
) -> ConfigResult<Duration> {
    let ms = match trimmed(value) {
        Some(v) => v.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            name,
            reason: format!("'{}' is not a whole number of milliseconds: {}", v, e),
        })?,
        None => default_ms,
    };
    Ok(Duration::from_millis(ms))
}

/// Parse a count from an optional environment value.
///
/// `None` or a blank value yields `default`.
pub fn count_from_env_value<T>(name: &'static str, value: Option<String>, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match trimmed(value) {
        Some(v) => v.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            name,
            reason: format!("'{}' is not a valid count: {}", v, e),
        }),
        None => Ok(default),
    }
}

/// Resolve a path from an optional environment value, falling back to `default`.
pub fn path_from_env_value(value: Option<String>, default: &str) -> PathBuf {
    PathBuf::from(trimmed(value).unwrap_or_else(|| default.to_string()))
}
