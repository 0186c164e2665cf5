//! Tracing subscriber setup
//!
//! The level and output format come from the configuration snapshot, or from
//! the raw source when logging starts before the full load. `RUST_LOG`, when
//! set, overrides the level. Output goes to stderr so that
//! stdout stays free for command output.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigSource, Snapshot};
use crate::schema::keys;

/// Accepted `LOG_LEVEL` values
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Log line encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` in any case selects JSON; anything else is text
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Subscriber level filter and encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogSettings {
    /// Settings from a loaded snapshot
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let defaults = Self::default();
        Self {
            level: snapshot
                .get_str(keys::LOG_LEVEL)
                .map(str::to_ascii_lowercase)
                .unwrap_or(defaults.level),
            format: snapshot
                .get_str(keys::LOG_FORMAT)
                .map(LogFormat::from_name)
                .unwrap_or(defaults.format),
        }
    }

    /// Settings read straight from a source, before the schema is applied.
    ///
    /// Unknown or absent values fall back to the defaults; the full load
    /// reports them as problems.
    pub fn from_source<S: ConfigSource + ?Sized>(source: &S) -> Self {
        let defaults = Self::default();
        let level = source
            .get(keys::LOG_LEVEL)
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| LOG_LEVELS.contains(&l.as_str()))
            .unwrap_or(defaults.level);
        let format = source
            .get(keys::LOG_FORMAT)
            .map(|f| LogFormat::from_name(f.trim()))
            .unwrap_or(defaults.format);
        Self { level, format }
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| LoggingError::Filter(format!("{}: {}", self.level, e))),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter {0}")]
    Filter(String),

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Install the global subscriber
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.filter()?)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|_| LoggingError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_configuration;
    use crate::rules::RuleSet;
    use crate::schema::{FieldSpec, Schema};
    use std::collections::HashMap;

    #[test]
    fn test_settings_from_snapshot() {
        let schema = Schema::new(vec![
            FieldSpec::new(keys::LOG_LEVEL, RuleSet::string()).default_str("info"),
            FieldSpec::new(keys::LOG_FORMAT, RuleSet::string()).default_str("text"),
        ])
        .unwrap();
        let source: HashMap<String, String> = [
            (keys::LOG_LEVEL.to_string(), "DEBUG".to_string()),
            (keys::LOG_FORMAT.to_string(), "json".to_string()),
        ]
        .into_iter()
        .collect();
        let snapshot = load_configuration(&source, &schema).unwrap();

        let settings = LogSettings::from_snapshot(&snapshot);
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn test_settings_from_source() {
        let source: HashMap<String, String> = [
            (keys::LOG_LEVEL.to_string(), " Warn ".to_string()),
            (keys::LOG_FORMAT.to_string(), "json".to_string()),
        ]
        .into_iter()
        .collect();
        let settings = LogSettings::from_source(&source);
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.format, LogFormat::Json);

        let bad: HashMap<String, String> =
            [(keys::LOG_LEVEL.to_string(), "loud".to_string())].into_iter().collect();
        assert_eq!(LogSettings::from_source(&bad), LogSettings::default());
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Text);
    }
}
