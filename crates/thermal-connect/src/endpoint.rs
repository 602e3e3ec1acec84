//! Service address of the thermal service

use std::fmt;
use std::str::FromStr;
use tonic::transport::Uri;

use crate::error::ConnectError;

/// Address the device-management service listens on out of the box
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:41959";

/// Immutable `http://host:port` address of the service.
///
/// Only bare plaintext authorities are accepted. TLS, credentials, a path,
/// a query, or a missing port is a construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn parse(address: &str) -> Result<Self, ConnectError> {
        let trimmed = address.trim();
        let uri: Uri = trimmed
            .parse()
            .map_err(|e| ConnectError::invalid_endpoint(address, format!("{}", e)))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some("https") => {
                return Err(ConnectError::invalid_endpoint(
                    address,
                    "https is not supported, the service listens on plaintext http",
                ))
            }
            Some(other) => {
                return Err(ConnectError::invalid_endpoint(
                    address,
                    format!("unsupported scheme '{}'", other),
                ))
            }
            None => {
                return Err(ConnectError::invalid_endpoint(
                    address,
                    "missing scheme (expected http://)",
                ))
            }
        }

        if uri.authority().is_some_and(|a| a.as_str().contains('@')) {
            return Err(ConnectError::invalid_endpoint(
                address,
                "endpoint must not carry user credentials",
            ));
        }

        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConnectError::invalid_endpoint(address, "missing host"))?;

        let port = uri
            .port_u16()
            .ok_or_else(|| ConnectError::invalid_endpoint(address, "missing port"))?;
        if port == 0 {
            return Err(ConnectError::invalid_endpoint(address, "port must be non-zero"));
        }

        if !matches!(uri.path(), "" | "/") || uri.query().is_some() {
            return Err(ConnectError::invalid_endpoint(
                address,
                "endpoint must not carry a path or query",
            ));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Endpoint {
    /// `http://127.0.0.1:41959`
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 41959,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
