//! Error types for the thermal-connect crate

use thiserror::Error;

/// Failure to build a connector. Call failures are never reported here; they
/// come back as [`RpcOutcome`](crate::RpcOutcome) values.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Invalid endpoint '{address}': {reason}")]
    InvalidEndpoint { address: String, reason: String },

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl ConnectError {
    pub(crate) fn invalid_endpoint(address: &str, reason: impl Into<String>) -> Self {
        ConnectError::InvalidEndpoint {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}
