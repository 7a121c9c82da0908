//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive. Values are trimmed; numeric
//! getters treat an unparsable value like a missing one.

use crate::domain::error::ScrapError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    ini: Ini,
    origin: String,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScrapError> {
        let origin = path.as_ref().display().to_string();
        let mut ini = Ini::new();
        ini.load(path.as_ref())
            .map_err(|reason| ScrapError::ConfigParse {
                file: origin.clone(),
                reason,
            })?;
        Ok(Self { ini, origin })
    }

    pub fn from_string(content: &str) -> Result<Self, ScrapError> {
        let origin = "<inline>".to_string();
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| ScrapError::ConfigParse {
                file: origin.clone(),
                reason,
            })?;
        Ok(Self { ini, origin })
    }

    /// Where the settings came from, for log and error messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn parsed<T: std::str::FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.get_string(section, key)?.parse().ok()
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key).map(|v| v.trim().to_string())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed(section, key).unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed(section, key).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ini_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn values_with_delimiters_survive() {
        let adapter = FileConfigAdapter::from_string(
            "[source]\nurl = https://www.zubicks.com/prices/\n\
             [logging]\nlevel = scraptrack=debug\n",
        )
        .unwrap();
        assert_eq!(
            adapter.get_string("source", "url").as_deref(),
            Some("https://www.zubicks.com/prices/")
        );
        assert_eq!(
            adapter.get_string("logging", "level").as_deref(),
            Some("scraptrack=debug")
        );
    }

    #[test]
    fn absent_keys_and_sections_are_none() {
        let adapter = FileConfigAdapter::from_string("[source]\nyard = Zubicks\n").unwrap();
        assert_eq!(adapter.get_string("source", "url"), None);
        assert_eq!(adapter.get_string("chart", "width"), None);
    }

    #[test]
    fn numbers_fall_back_when_unreadable() {
        let adapter = FileConfigAdapter::from_string(
            "[chart]\nwidth = wide\nheight = 480\n[ingest]\npounds_per_net_ton = a ton\n",
        )
        .unwrap();
        assert_eq!(adapter.get_int("chart", "width", 960), 960);
        assert_eq!(adapter.get_int("chart", "height", 720), 480);
        assert_eq!(adapter.get_int("chart", "depth", 3), 3);
        assert_eq!(adapter.get_double("ingest", "pounds_per_net_ton", 2000.0), 2000.0);
    }

    #[test]
    fn doubles_are_parsed() {
        let adapter =
            FileConfigAdapter::from_string("[ingest]\npounds_per_net_ton = 2204.6\n").unwrap();
        assert_eq!(adapter.get_double("ingest", "pounds_per_net_ton", 0.0), 2204.6);
    }

    #[test]
    fn names_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[SQLite]\nPath = prices.db\n").unwrap();
        assert_eq!(adapter.get_string("sqlite", "path").as_deref(), Some("prices.db"));
    }

    #[test]
    fn file_origin_is_recorded() {
        let file = ini_file("[chart]\noutput = /tmp/copper.svg\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.origin(), file.path().display().to_string());
        assert_eq!(
            adapter.get_string("chart", "output").as_deref(),
            Some("/tmp/copper.svg")
        );
    }

    #[test]
    fn missing_file_is_parse_error_naming_it() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/scraptrack.ini").unwrap_err();
        match err {
            ScrapError::ConfigParse { file, .. } => {
                assert_eq!(file, "/nonexistent/path/scraptrack.ini")
            }
            other => panic!("expected ConfigParse, got {other}"),
        }
    }
}
