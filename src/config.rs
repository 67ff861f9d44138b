//! Configuration loading
//!
//! The server reads a small TOML file. Every key is optional; a missing
//! file means "use the defaults".

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCP port to listen on
    pub port: u16,
    /// Directory holding the room transcript (`~` is expanded)
    pub log_file_path: String,
    /// Display name of the room; also names the transcript file
    pub room_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 2323,
            log_file_path: ".".to_string(),
            room_name: "Telnet Chat".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Config file ({}) not found, using the default configuration",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                warn!("Error reading config file, falling back to default values: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("port = 4000").unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.log_file_path, ".");
        assert_eq!(config.room_name, "Telnet Chat");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 2424").unwrap();
        writeln!(file, "log_file_path = \"~/chat\"").unwrap();
        writeln!(file, "room_name = \"Night Owls\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.port, 2424);
        assert_eq!(config.log_file_path, "~/chat");
        assert_eq!(config.room_name, "Night Owls");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
        assert_eq!(Config::load_or_default(file.path()), Config::default());
    }
}
