//! # Configuration
//!
//! Backend selection and cache settings, read from an optional JSON file and
//! then overridden from the environment:
//!
//! | Variable          | Overrides          |
//! |-------------------|--------------------|
//! | `ZCAL_BACKEND`    | `backend.mode`     |
//! | `ZCAL_API_URL`    | `backend.base_url` |
//! | `ZCAL_TIMEOUT_MS` | `backend.timeout_ms` |
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "backend": { "mode": "remote", "base_url": "http://localhost:5000/api" },
//!   "cache": { "memoize_results": false }
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};

pub const ENV_BACKEND: &str = "ZCAL_BACKEND";
pub const ENV_API_URL: &str = "ZCAL_API_URL";
pub const ENV_TIMEOUT_MS: &str = "ZCAL_TIMEOUT_MS";

/// Where calculations run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// In-process formula evaluation
    #[default]
    Local,
    /// HTTP calls to a compute endpoint
    Remote,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Local => f.write_str("local"),
            BackendMode::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for BackendMode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendMode::Local),
            "remote" => Ok(BackendMode::Remote),
            other => Err(CalcError::config(
                "backend.mode",
                format!("expected 'local' or 'remote', got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub base_url: String,
    pub timeout_ms: u64,
    /// Total attempts for transport failures
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Local,
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 10_000,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize results by (geometry, parameters)
    pub memoize_results: bool,
    /// Lifetime of cached endpoint responses
    pub response_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memoize_results: true,
            response_ttl_secs: 3600,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load from `path` (if given), apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> CalcResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CalcResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CalcError::config(path.display().to_string(), format!("cannot read file: {}", e))
        })?;
        let config = serde_json::from_str(&text).map_err(|e| {
            CalcError::config(path.display().to_string(), format!("invalid JSON: {}", e))
        })?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CalcResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_BACKEND) {
            self.backend.mode = mode.parse()?;
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.backend.base_url = url.trim().to_string();
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.backend.timeout_ms = timeout.trim().parse().map_err(|_| {
                CalcError::config(ENV_TIMEOUT_MS, format!("'{}' is not a whole number of milliseconds", timeout))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(CalcError::config("backend.base_url", "must not be empty"));
        }
        if self.backend.timeout_ms == 0 {
            return Err(CalcError::config("backend.timeout_ms", "must be greater than zero"));
        }
        if self.backend.retry_attempts == 0 {
            return Err(CalcError::config("backend.retry_attempts", "must be at least 1"));
        }
        Ok(())
    }
}
