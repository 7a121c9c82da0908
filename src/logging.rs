//! Logging initialization.

use crate::domain::app_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, fmt};

impl LoggingConfig {
    /// Install the global subscriber. Logs go to stderr so stdout stays
    /// reserved for command output. `RUST_LOG` overrides the configured
    /// level. A second call is a no-op.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let _ = match self.format {
            LogFormat::Json => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            LogFormat::Pretty => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        let config = LoggingConfig::default();
        config.init();
        LoggingConfig {
            level: "debug".into(),
            format: LogFormat::Json,
        }
        .init();
    }
}
