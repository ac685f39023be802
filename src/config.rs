use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::api::coinbase::CoinbaseClient;

pub const DEFAULT_COINS: [&str; 3] = ["bitcoin", "ethereum", "solana"];
pub const DEFAULT_REFRESH_MS: u64 = 10_000;
pub const DEFAULT_OUTPUT: &str = "charts.html";

/// What to do when the timer fires while an earlier cycle is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Start another cycle anyway; the last one to finish owns the page
    #[default]
    Concurrent,
    /// Drop the tick
    Skip,
}

impl FromStr for OverlapPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concurrent" => Ok(OverlapPolicy::Concurrent),
            "skip" => Ok(OverlapPolicy::Skip),
            other => Err(ConfigError::Invalid {
                key: "COINBOARD_OVERLAP",
                value: other.to_string(),
                reason: "expected `concurrent` or `skip`",
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Everything the refresh driver needs, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    /// Tracked coin ids, in display order
    pub coins: Vec<String>,
    pub refresh_interval: Duration,
    pub overlap: OverlapPolicy,
    /// Where the page is published; `None` keeps it in memory only
    pub output: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_url: CoinbaseClient::DEFAULT_BASE_URL.to_string(),
            coins: DEFAULT_COINS.iter().map(|c| c.to_string()).collect(),
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_MS),
            overlap: OverlapPolicy::default(),
            output: Some(PathBuf::from(DEFAULT_OUTPUT)),
        }
    }
}

impl AppConfig {
    /// Build from `COINBOARD_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(url) = lookup("COINBOARD_BASE_URL") {
            config.base_url = url;
        }

        if let Some(raw) = lookup("COINBOARD_COINS") {
            config.coins = parse_coins(&raw)?;
        }

        if let Some(raw) = lookup("COINBOARD_REFRESH_MS") {
            let ms = raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0).ok_or(
                ConfigError::Invalid {
                    key: "COINBOARD_REFRESH_MS",
                    value: raw.clone(),
                    reason: "expected a positive number of milliseconds",
                },
            )?;
            config.refresh_interval = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("COINBOARD_OVERLAP") {
            config.overlap = raw.parse()?;
        }

        if let Some(path) = lookup("COINBOARD_OUTPUT") {
            config.output = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

fn parse_coins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let coins: Vec<String> = raw
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    if coins.is_empty() {
        return Err(ConfigError::Invalid {
            key: "COINBOARD_COINS",
            value: raw.to_string(),
            reason: "at least one coin id is required",
        });
    }

    Ok(coins)
}
