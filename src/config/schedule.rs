//! Scheduler configuration structures.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::retry::RetryPolicy;

/// Store backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// Journal kept in memory; state is lost on restart.
    InMemory,
    /// JSON-lines journal on disk.
    File {
        /// Directory holding the journal file.
        path: PathBuf,
        /// Journal stream name, used as the file prefix.
        stream: String,
    },
}

/// Backoff settings for resynchronization reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry.
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 50,
            max_delay_ms: 2_000,
        }
    }
}

impl RetrySettings {
    /// Convert to the policy used by `retry_with_backoff`.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            ..RetryPolicy::default()
        }
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Capacity of every slot.
    pub max_candidates: u32,
    /// Store backend selection.
    pub store: StoreBackendConfig,
    /// Events buffered per change-feed channel before subscribers lag.
    pub change_feed_capacity: usize,
    /// How long a booking call may wait for the store.
    pub request_timeout_ms: u64,
    /// Resync backoff.
    pub retry: RetrySettings,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_candidates: 3,
            store: StoreBackendConfig::InMemory,
            change_feed_capacity: 64,
            request_timeout_ms: 10_000,
            retry: RetrySettings::default(),
        }
    }
}

impl ScheduleConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Describes the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_candidates == 0 {
            return Err("max_candidates must be greater than 0".into());
        }
        if self.change_feed_capacity == 0 {
            return Err("change_feed_capacity must be greater than 0".into());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than 0".into());
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err("retry.initial_delay_ms must not exceed retry.max_delay_ms".into());
        }
        if let StoreBackendConfig::File { stream, .. } = &self.store {
            if stream.trim().is_empty() {
                return Err("store stream name must not be blank".into());
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `CASTING_*` environment variables, reading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// A variable that does not parse, or validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ScheduleConfig::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// A variable that does not parse, or validation failure.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut cfg = Self::default();
        if let Some(max) = parse_var(&lookup, "CASTING_MAX_CANDIDATES")? {
            cfg.max_candidates = max;
        }
        if let Some(capacity) = parse_var(&lookup, "CASTING_FEED_CAPACITY")? {
            cfg.change_feed_capacity = capacity;
        }
        if let Some(timeout) = parse_var(&lookup, "CASTING_REQUEST_TIMEOUT_MS")? {
            cfg.request_timeout_ms = timeout;
        }
        if let Some(path) = lookup("CASTING_STORE_PATH") {
            cfg.store = StoreBackendConfig::File {
                path: PathBuf::from(path),
                stream: lookup("CASTING_STORE_STREAM").unwrap_or_else(|| "schedule".into()),
            };
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Booking timeout as a duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| format!("{key} is invalid: {e}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = ScheduleConfig::default();
        assert_eq!(cfg.max_candidates, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CASTING_MAX_CANDIDATES", "5"),
            ("CASTING_STORE_PATH", "/var/lib/casting"),
        ]
        .into_iter()
        .collect();
        let cfg = ScheduleConfig::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap();
        assert_eq!(cfg.max_candidates, 5);
        assert_eq!(
            cfg.store,
            StoreBackendConfig::File {
                path: PathBuf::from("/var/lib/casting"),
                stream: "schedule".into(),
            }
        );
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let err = ScheduleConfig::from_lookup(|k| {
            (k == "CASTING_FEED_CAPACITY").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.contains("CASTING_FEED_CAPACITY"));
    }
}
