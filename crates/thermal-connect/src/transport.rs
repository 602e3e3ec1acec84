//! Transport seam between the connector and the network
//!
//! A transport moves opaque request bytes to one of the service procedures and
//! hands back everything the peer answered with as a [`CallEnvelope`]. It does
//! not interpret payloads; classification is the connector's job.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use tonic::metadata::MetadataMap;
use tonic::Code;

use crate::outcome::grpc_code_name;

/// Procedures of the `protocol.Thermal` service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThermalMethod {
    GetCurrentProfile,
    UpdateProfile,
}

impl ThermalMethod {
    /// HTTP/2 path of the procedure
    pub fn path(self) -> &'static str {
        match self {
            ThermalMethod::GetCurrentProfile => thermal_proto::paths::GET_CURRENT_PROFILE,
            ThermalMethod::UpdateProfile => thermal_proto::paths::UPDATE_PROFILE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThermalMethod::GetCurrentProfile => "GetCurrentProfile",
            ThermalMethod::UpdateProfile => "UpdateProfile",
        }
    }
}

impl fmt::Display for ThermalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything one completed call produced. Owned by the call that created it.
#[derive(Debug, Clone)]
pub struct CallEnvelope {
    /// Encoded request as sent
    pub request: Bytes,

    /// Status reported by the peer
    pub status: Code,

    pub status_message: String,

    /// Response header metadata
    pub headers: MetadataMap,

    /// Trailer metadata (for error statuses, the metadata the status arrived with)
    pub trailers: MetadataMap,

    /// Response message, `None` when the peer sent no message at all
    pub payload: Option<Bytes>,
}

impl CallEnvelope {
    /// A call the peer answered with `OK`
    pub fn ok(request: Bytes, payload: Option<Bytes>) -> Self {
        Self {
            request,
            status: Code::Ok,
            status_message: String::new(),
            headers: MetadataMap::new(),
            trailers: MetadataMap::new(),
            payload,
        }
    }

    /// A call the peer answered with a status and no message
    pub fn with_status(request: Bytes, status: Code, message: impl Into<String>) -> Self {
        Self {
            request,
            status,
            status_message: message.into(),
            headers: MetadataMap::new(),
            trailers: MetadataMap::new(),
            payload: None,
        }
    }
}

/// The call never completed: unreachable peer, broken framing, timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub code: Code,
    pub message: String,
}

impl TransportFailure {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", grpc_code_name(self.code), self.message)
    }
}

impl std::error::Error for TransportFailure {}

/// Unary request/response transport to the thermal service.
///
/// Implementations hold no per-call state; concurrent calls on one transport
/// are independent. Dropping the returned future abandons the call.
#[async_trait]
pub trait ThermalTransport: Send + Sync {
    async fn unary(
        &self,
        method: ThermalMethod,
        request: Bytes,
    ) -> Result<CallEnvelope, TransportFailure>;
}
