//! Typed application configuration built from an INI source.

use crate::domain::config_validation::validate_config;
use crate::domain::error::ScrapError;
use crate::domain::ingest::{DEFAULT_POUNDS_PER_NET_TON, IngestConfig};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_YARD: &str = "Zubicks";
pub const DEFAULT_SOURCE_URL: &str = "https://www.zubicks.com/prices/";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub yard: String,
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub source: SourceConfig,
    pub ingest: IngestConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate, then read every section with its defaults applied.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, ScrapError> {
        validate_config(config)?;

        Ok(Self {
            store: StoreConfig {
                path: PathBuf::from(config.require_string("sqlite", "path")?),
                pool_size: config.get_int("sqlite", "pool_size", 4) as u32,
            },
            source: SourceConfig {
                yard: config.get_string_or("source", "yard", DEFAULT_YARD),
                url: config.get_string_or("source", "url", DEFAULT_SOURCE_URL),
                timeout_secs: config.get_int("source", "timeout_secs", 30) as u64,
                user_agent: config.get_string_or(
                    "source",
                    "user_agent",
                    concat!("scraptrack/", env!("CARGO_PKG_VERSION")),
                ),
            },
            ingest: IngestConfig {
                pounds_per_net_ton: config.get_double(
                    "ingest",
                    "pounds_per_net_ton",
                    DEFAULT_POUNDS_PER_NET_TON,
                ),
            },
            chart: ChartConfig {
                width: config.get_int("chart", "width", 960) as u32,
                height: config.get_int("chart", "height", 720) as u32,
                output: PathBuf::from(config.get_string_or("chart", "output", "chart.svg")),
            },
            logging: logging_config(config),
        })
    }
}

/// Logging settings on their own, so logging can start before full
/// validation has run.
pub fn logging_config(config: &dyn ConfigPort) -> LoggingConfig {
    let defaults = LoggingConfig::default();
    LoggingConfig {
        level: config.get_string_or("logging", "level", &defaults.level),
        format: match config.get_string("logging", "format").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => defaults.format,
        },
    }
}
