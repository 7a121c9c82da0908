//! Configuration validation.
//!
//! Validates every section before any store or source is opened.

use crate::domain::error::ScrapError;
use crate::ports::config_port::ConfigPort;

pub const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), ScrapError> {
    validate_sqlite(config)?;
    validate_source(config)?;
    validate_ingest(config)?;
    validate_chart(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScrapError {
    ScrapError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_sqlite(config: &dyn ConfigPort) -> Result<(), ScrapError> {
    config.require_string("sqlite", "path")?;
    if config.get_int("sqlite", "pool_size", 4) < 1 {
        return Err(invalid("sqlite", "pool_size", "pool_size must be at least 1"));
    }
    Ok(())
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), ScrapError> {
    if let Some(yard) = config.get_string("source", "yard") {
        if yard.trim().is_empty() {
            return Err(invalid("source", "yard", "yard must not be empty"));
        }
    }

    if let Some(url) = config.get_string("source", "url") {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("source", "url", "url must start with http:// or https://"));
        }
    }

    if config.get_int("source", "timeout_secs", 30) < 1 {
        return Err(invalid("source", "timeout_secs", "timeout_secs must be at least 1"));
    }
    Ok(())
}

fn validate_ingest(config: &dyn ConfigPort) -> Result<(), ScrapError> {
    let value = config.get_double("ingest", "pounds_per_net_ton", 2000.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            "ingest",
            "pounds_per_net_ton",
            "pounds_per_net_ton must be positive",
        ));
    }
    Ok(())
}

fn validate_chart(config: &dyn ConfigPort) -> Result<(), ScrapError> {
    for (key, default) in [("width", 960), ("height", 720)] {
        if config.get_int("chart", key, default) < 100 {
            return Err(invalid("chart", key, "chart dimensions must be at least 100"));
        }
    }
    Ok(())
}

fn validate_logging(config: &dyn ConfigPort) -> Result<(), ScrapError> {
    match config.get_string("logging", "format") {
        Some(format) if !LOG_FORMATS.contains(&format.trim()) => Err(invalid(
            "logging",
            "format",
            "format must be one of: pretty, json",
        )),
        _ => Ok(()),
    }
}
