/*!
 * Configuration types for thermalctl
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thermal_connect::{Endpoint, Framing, TransportOptions, DEFAULT_ENDPOINT};

use crate::error::{CliError, Result};

/// Client configuration, usually loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the device-management service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Wire protocol spoken to the service
    #[serde(default)]
    pub protocol: Protocol,

    /// Seconds allowed for establishing the connection (None = no limit)
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Seconds allowed for a whole call (None = no limit)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            protocol: Protocol::default(),
            connect_timeout_secs: Some(5),
            request_timeout_secs: None,
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

/// Wire protocol spoken to the service
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    /// Native gRPC over HTTP/2
    #[default]
    Grpc,

    /// grpc-web over HTTP/1.1
    GrpcWeb,
}

impl Protocol {
    pub fn to_framing(self) -> Framing {
        match self {
            Protocol::Grpc => Framing::Grpc,
            Protocol::GrpcWeb => Framing::GrpcWeb,
        }
    }
}

/// Log level for diagnostic output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validated service endpoint
    pub fn endpoint(&self) -> Result<Endpoint> {
        Ok(Endpoint::parse(&self.endpoint)?)
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            framing: self.protocol.to_framing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:41959");
        assert_eq!(config.connect_timeout_secs, Some(5));
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(!config.verbose);
    }

    #[test]
    fn test_serialization() {
        let config = ClientConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: ClientConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.connect_timeout_secs, None);
    }

    #[test]
    fn test_readme_config_example() {
        let toml_str = r#"
endpoint = "http://192.168.1.20:41959"
protocol = "grpc-web"
connect_timeout_secs = 3
request_timeout_secs = 10
log_level = "debug"
log_file = "/tmp/thermalctl.log"
"#;

        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/thermalctl.log")));

        let endpoint = config.endpoint().unwrap();
        assert_eq!(endpoint.host(), "192.168.1.20");
        assert_eq!(endpoint.port(), 41959);

        let options = config.transport_options();
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(options.request_timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.framing, Framing::GrpcWeb);
    }

    #[test]
    fn test_protocol_defaults_to_grpc() {
        let config: ClientConfig = toml::from_str("endpoint = \"http://127.0.0.1:41959\"").unwrap();
        assert_eq!(config.protocol, Protocol::Grpc);
        assert_eq!(config.transport_options().framing, Framing::Grpc);
    }

    #[test]
    fn test_bad_endpoint_is_fatal() {
        let config = ClientConfig {
            endpoint: "127.0.0.1:41959".to_string(),
            ..Default::default()
        };
        let err = config.endpoint().unwrap_err();
        assert!(matches!(err, CliError::Connect(_)));
        assert_eq!(err.exit_code(), crate::error::EXIT_FATAL);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thermalctl.toml");

        let config = ClientConfig {
            endpoint: "http://10.0.0.5:41959".to_string(),
            verbose: true,
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        assert_eq!(ClientConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ClientConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Info.to_tracing_level(), tracing::Level::INFO);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
