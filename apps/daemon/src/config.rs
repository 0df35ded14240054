use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => bail!("Invalid CF_LOG_FORMAT '{}': expected text or json", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    /// Canonical `BASE_QUOTE` names
    pub tracked_pairs: Vec<String>,
    pub history_start: i64,
    pub request_timeout: Duration,
    pub skip_asset_check: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let data_dir = PathBuf::from(var("CF_DATA_DIR", "./data"));
        let poll_secs: u64 = var("CF_POLL_INTERVAL_SECS", "20")
            .parse()
            .context("Invalid CF_POLL_INTERVAL_SECS")?;
        if poll_secs == 0 {
            bail!("Invalid CF_POLL_INTERVAL_SECS: must be at least 1");
        }
        let tracked_pairs = var("CF_TRACKED_PAIRS", "BTC_EUR,ETH_EUR")
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        let history_start: i64 = var("CF_HISTORY_START", "1451606400")
            .parse()
            .context("Invalid CF_HISTORY_START")?;
        let timeout_ms: u64 = var("CF_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid CF_REQUEST_TIMEOUT_MS")?;
        let skip_asset_check: bool = var("CF_SKIP_ASSET_CHECK", "false")
            .parse()
            .context("Invalid CF_SKIP_ASSET_CHECK")?;
        let log_format = var("CF_LOG_FORMAT", "text").parse()?;

        Ok(Self {
            data_dir,
            poll_interval: Duration::from_secs(poll_secs),
            tracked_pairs,
            history_start,
            request_timeout: Duration::from_millis(timeout_ms),
            skip_asset_check,
            log_format,
        })
    }
}
