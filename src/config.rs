//! Server configuration.
//!
//! Resolved in layers: built-in defaults, an optional TOML file, the
//! `PORT` environment variable, then command-line flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Configuration for the game server process.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    port: u16,

    /// Directory served for any request that is not the WebSocket endpoint.
    #[serde(default = "default_public_dir")]
    public_dir: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given and present, otherwise the defaults.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                info!("Config file not found at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies a `PORT` value from the environment. Unparseable values are ignored.
    #[instrument(skip(self))]
    pub fn with_port_var(mut self, value: Option<&str>) -> Self {
        match value.map(str::parse::<u16>) {
            Some(Ok(port)) => {
                debug!(port, "Port taken from environment");
                self.port = port;
            }
            Some(Err(e)) => warn!(error = %e, "Ignoring invalid PORT"),
            None => {}
        }
        self
    }

    /// Applies command-line overrides.
    #[instrument(skip(self))]
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        public_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(public_dir) = public_dir {
            self.public_dir = public_dir;
        }
        self
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(*config.port(), 3000);
        assert_eq!(config.public_dir(), &PathBuf::from("public"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080").unwrap();
        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.host(), "127.0.0.1");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"eighty\"").unwrap();
        let err = ServerConfig::load(Some(file.path())).unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_layering_order() {
        let config = ServerConfig::default()
            .with_port_var(Some("4000"))
            .with_overrides(None, Some(5000), None);
        assert_eq!(*config.port(), 5000);

        let config = ServerConfig::default()
            .with_port_var(Some("not a port"))
            .with_overrides(Some("0.0.0.0".to_string()), None, None);
        assert_eq!(*config.port(), 3000);
        assert_eq!(config.host(), "0.0.0.0");
    }
}
