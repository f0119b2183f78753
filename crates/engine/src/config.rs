//! Engine tunables loaded from environment variables.

use std::time::Duration;

use casework_core::quota::{
    validate_daily_limit, DEFAULT_LAWYER_DAILY_LIMIT, DEFAULT_USER_DAILY_PUBLISH_LIMIT,
};

use crate::retry::RetryPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Engine configuration.
///
/// | Env Var                          | Default |
/// |----------------------------------|---------|
/// | `LAWYER_DAILY_LIMIT`             | `3`     |
/// | `USER_DAILY_PUBLISH_LIMIT`       | `5`     |
/// | `OFFER_TIMEOUT_SECS`             | `7200`  |
/// | `OFFER_SWEEP_INTERVAL_SECS`      | `60`    |
/// | `WORKLOAD_REFRESH_INTERVAL_SECS` | `300`   |
/// | `WORKLOAD_CACHE_TTL_SECS`        | `60`    |
/// | `WORKLOAD_CACHE_CAPACITY`        | `1024`  |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub lawyer_daily_limit: i32,
    pub user_daily_publish_limit: i32,
    /// Unconfirmed offers older than this are expired by the sweep.
    pub offer_timeout: Duration,
    pub offer_sweep_interval: Duration,
    pub workload_refresh_interval: Duration,
    pub workload_cache_ttl: Duration,
    pub workload_cache_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lawyer_daily_limit: DEFAULT_LAWYER_DAILY_LIMIT,
            user_daily_publish_limit: DEFAULT_USER_DAILY_PUBLISH_LIMIT,
            offer_timeout: Duration::from_secs(7200),
            offer_sweep_interval: Duration::from_secs(60),
            workload_refresh_interval: Duration::from_secs(300),
            workload_cache_ttl: Duration::from_secs(60),
            workload_cache_capacity: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let lawyer_daily_limit = parse_limit(&lookup, "LAWYER_DAILY_LIMIT", defaults.lawyer_daily_limit)?;
        let user_daily_publish_limit = parse_limit(
            &lookup,
            "USER_DAILY_PUBLISH_LIMIT",
            defaults.user_daily_publish_limit,
        )?;

        Ok(Self {
            lawyer_daily_limit,
            user_daily_publish_limit,
            offer_timeout: parse_secs(&lookup, "OFFER_TIMEOUT_SECS", defaults.offer_timeout)?,
            offer_sweep_interval: parse_secs(
                &lookup,
                "OFFER_SWEEP_INTERVAL_SECS",
                defaults.offer_sweep_interval,
            )?,
            workload_refresh_interval: parse_secs(
                &lookup,
                "WORKLOAD_REFRESH_INTERVAL_SECS",
                defaults.workload_refresh_interval,
            )?,
            workload_cache_ttl: parse_secs(&lookup, "WORKLOAD_CACHE_TTL_SECS", defaults.workload_cache_ttl)?,
            workload_cache_capacity: match lookup("WORKLOAD_CACHE_CAPACITY") {
                None => defaults.workload_cache_capacity,
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(ConfigError::Invalid {
                        name: "WORKLOAD_CACHE_CAPACITY",
                        value: raw,
                        expected: "a positive integer",
                    })?,
            },
            retry: defaults.retry,
        })
    }

    /// Claim limit for a lawyer, honouring a per-profile override.
    pub fn lawyer_limit(&self, profile_override: Option<i32>) -> i32 {
        profile_override.unwrap_or(self.lawyer_daily_limit)
    }
}

fn parse_limit(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: i32,
) -> Result<i32, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|n| validate_daily_limit(*n).is_ok())
        .ok_or(ConfigError::Invalid {
            name,
            value: raw,
            expected: "an integer between 1 and 1000",
        })
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .map(Duration::from_secs)
        .ok_or(ConfigError::Invalid {
            name,
            value: raw,
            expected: "a positive number of seconds",
        })
}
