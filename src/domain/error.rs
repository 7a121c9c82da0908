//! Domain error types.

/// Top-level error type for scraptrack.
#[derive(Debug, thiserror::Error)]
pub enum ScrapError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no price data available")]
    NoDataAvailable,

    #[error("price source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("unexpected price source format: {reason}")]
    SourceFormat { reason: String },

    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScrapError> for std::process::ExitCode {
    fn from(err: &ScrapError) -> Self {
        let code: u8 = match err {
            ScrapError::Io(_) => 1,
            ScrapError::ConfigParse { .. }
            | ScrapError::ConfigMissing { .. }
            | ScrapError::ConfigInvalid { .. } => 2,
            ScrapError::Database { .. } | ScrapError::DatabaseQuery { .. } => 3,
            ScrapError::SourceUnavailable { .. } | ScrapError::SourceFormat { .. } => 4,
            ScrapError::NoDataAvailable => 5,
            ScrapError::InvalidSelection { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
