//! Configuration access port trait.

use crate::domain::error::ScrapError;

/// Sectioned key/value settings. Numeric getters fall back to `default` when
/// the key is missing or does not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Non-blank value or [`ScrapError::ConfigMissing`].
    fn require_string(&self, section: &str, key: &str) -> Result<String, ScrapError> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ScrapError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
    }

    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}
