//! Configuration file parsing and structures.
//!
//! wardend uses TOML for declarative configuration. The security section is
//! read once at startup and passed into the controller as an immutable
//! snapshot; nothing re-reads it at arm time.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use crate::security::NightMode;

/// Top-level configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    pub location: LocationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,
}

/// Which vendor location this instance bridges.
#[derive(Debug, Deserialize)]
pub struct LocationConfig {
    /// Stable vendor identifier of the location.
    pub id: String,

    /// Display name, for logs.
    pub name: String,
}

/// Security-system behavior.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Night-mode synthesis: "disabled", "away", or "home".
    #[serde(default)]
    pub night_mode: NightMode,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        toml::from_str(&contents).map_err(ConfigError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [location]
            id = "loc-1"
            name = "Home"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.location.id, "loc-1");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.security.night_mode, NightMode::Disabled);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [location]
            id = "loc-1"
            name = "Home"

            [logging]
            level = "debug"

            [security]
            night_mode = "away"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.security.night_mode, NightMode::Away);
    }

    #[test]
    fn test_invalid_night_mode_rejected() {
        let toml = r#"
            [location]
            id = "loc-1"
            name = "Home"

            [security]
            night_mode = "sometimes"
        "#;

        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
                [location]
                id = "loc-9"
                name = "Cabin"

                [security]
                night_mode = "home"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.location.id, "loc-9");
        assert_eq!(config.security.night_mode, NightMode::Home);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Config::from_file("/nonexistent/wardend.toml"),
            Err(ConfigError::Io(_, _))
        ));
    }
}
