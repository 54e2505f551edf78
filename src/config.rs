//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;
use strum::{Display, EnumString};

/// Where the freshness window is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WindowAnchor {
    /// Cutoff measured back from the newest tick in the store.
    #[default]
    LatestTick,
    /// Cutoff measured back from the cycle's reference instant.
    Now,
}

/// The only tunables the detection engine accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionParams {
    /// Minimum gross profit percentage for a candidate (e.g. 0.5 = 0.5%).
    pub min_profit_pct: Decimal,
    /// Freshness window length in seconds.
    pub max_age_seconds: u64,
    /// Window anchoring mode.
    pub anchor: WindowAnchor,
}

impl DetectionParams {
    /// Create parameters anchored at the latest tick.
    pub fn new(min_profit_pct: Decimal, max_age_seconds: u64) -> Self {
        Self {
            min_profit_pct,
            max_age_seconds,
            anchor: WindowAnchor::LatestTick,
        }
    }

    /// Use a different window anchor.
    pub fn with_anchor(mut self, anchor: WindowAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_profit_pct <= Decimal::ZERO {
            return Err("MIN_PROFIT_PCT must be greater than 0".to_string());
        }

        if self.max_age_seconds == 0 {
            return Err("MAX_AGE_SECONDS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Window length as a duration.
    pub fn max_age(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.max_age_seconds).unwrap_or(i64::MAX))
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Detection Parameters ===
    /// Minimum gross profit percentage to emit a candidate.
    #[serde(default = "default_min_profit_pct")]
    pub min_profit_pct: Decimal,

    /// Maximum tick age in seconds.
    #[serde(default = "default_max_age_seconds")]
    pub max_age_seconds: u64,

    /// Window anchor: `latest-tick` or `now`.
    #[serde(default)]
    pub window_anchor: WindowAnchor,

    /// Milliseconds between detection cycles.
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,

    // === Reference Data ===
    /// Exchange reference feed (JSON array).
    #[serde(default = "default_exchanges_file")]
    pub exchanges_file: PathBuf,

    /// Asset reference feed (JSON array).
    #[serde(default = "default_assets_file")]
    pub assets_file: PathBuf,

    /// Optional ticks to preload into the store (JSON array).
    #[serde(default)]
    pub ticks_file: Option<PathBuf>,

    // === Server Configuration ===
    /// HTTP server port for health/metrics endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_min_profit_pct() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

fn default_max_age_seconds() -> u64 {
    60
}

fn default_scan_interval_ms() -> u64 {
    1000
}

fn default_exchanges_file() -> PathBuf {
    PathBuf::from("data/exchanges.json")
}

fn default_assets_file() -> PathBuf {
    PathBuf::from("data/assets.json")
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_profit_pct: default_min_profit_pct(),
            max_age_seconds: default_max_age_seconds(),
            window_anchor: WindowAnchor::default(),
            scan_interval_ms: default_scan_interval_ms(),
            exchanges_file: default_exchanges_file(),
            assets_file: default_assets_file(),
            ticks_file: None,
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        self.detection_params().validate()?;

        if self.scan_interval_ms == 0 {
            return Err("SCAN_INTERVAL_MS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Engine parameters derived from this configuration.
    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams::new(self.min_profit_pct, self.max_age_seconds)
            .with_anchor(self.window_anchor)
    }

    /// Directive string for the tracing `EnvFilter`.
    ///
    /// Verbose mode raises this crate to `debug` and leaves everything else at
    /// `info`; otherwise `RUST_LOG` is used as given.
    pub fn log_filter(&self, verbose: bool) -> String {
        if verbose || self.verbose {
            "cross_exchange_arb=debug,info".to_string()
        } else {
            self.rust_log.clone()
        }
    }

    /// Cadence of the detection loop.
    pub fn scan_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.scan_interval_ms)
    }
}
