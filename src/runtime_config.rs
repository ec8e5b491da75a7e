// =============================================================================
// Runtime Configuration — advisor settings
// =============================================================================
//
// Every field carries a serde default so that an older or partial
// `advisor_config.json` still loads.  The file is only ever read; environment
// overrides live in memory for the lifetime of the process.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::market_data::yahoo::DEFAULT_BASE_URL;
use crate::market_data::Lookback;
use crate::risk::SizingParams;
use crate::strategy::Strategy;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_capital() -> f64 {
    120_000.0
}

fn default_risk_pct() -> f64 {
    2.0
}

fn default_yahoo_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the JSON API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Strategy used when a request does not name one.
    #[serde(default)]
    pub default_strategy: Strategy,

    /// History window requested from the provider.
    #[serde(default)]
    pub lookback: Lookback,

    /// Account capital for position sizing.
    #[serde(default = "default_capital")]
    pub capital: f64,

    /// Percentage of capital risked per trade (0.5 - 5.0 in practice).
    #[serde(default = "default_risk_pct")]
    pub risk_pct: f64,

    /// JSON-lines trade journal.  `None` keeps the journal in memory.
    #[serde(default)]
    pub trade_log_path: Option<String>,

    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            default_strategy: Strategy::default(),
            lookback: Lookback::default(),
            capital: default_capital(),
            risk_pct: default_risk_pct(),
            trade_log_path: None,
            yahoo_base_url: default_yahoo_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            strategy = %config.default_strategy,
            lookback = config.lookback.as_range(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `ADVISOR_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`; blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(addr) = value("ADVISOR_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(path) = value("ADVISOR_TRADE_LOG") {
            self.trade_log_path = Some(path);
        }
    }

    pub fn sizing(&self) -> SizingParams {
        SizingParams {
            capital: self.capital,
            risk_pct: self.risk_pct,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
