use crate::error::{AutoconfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix of environment variables overriding file settings,
/// e.g. `AUTOCONFIG__SERVER__LISTEN_ADDR`
pub const ENV_PREFIX: &str = "AUTOCONFIG";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// LDAP connect timeout; unset means the client library default
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl DirectoryConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load a TOML file, then apply `AUTOCONFIG__*` environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AutoconfigError::Config(e.to_string()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AutoconfigError::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://autoconfig.db".to_string(),
            },
            directory: DirectoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
        [server]
        listen_addr = "127.0.0.1:4243"

        [database]
        url = "sqlite::memory:"

        [directory]
        connect_timeout_secs = 5

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(SAMPLE).unwrap();

        assert_eq!(config.server.listen_addr, "127.0.0.1:4243");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.directory.connect_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_optional_sections_default() {
        let config = Config::from_toml(
            r#"
            [server]
            listen_addr = "0.0.0.0:80"

            [database]
            url = "sqlite://autoconfig.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.directory.connect_timeout(), None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_section_is_error() {
        let err = Config::from_toml("[server]\nlisten_addr = \"0.0.0.0:80\"\n").unwrap_err();
        assert!(matches!(err, AutoconfigError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:4243");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/nonexistent/autoconfig.toml").unwrap_err();
        assert!(matches!(err, AutoconfigError::Config(_)));
    }
}
