//! Terminal result of a thermal service call

use thermal_proto::Profile;
use thiserror::Error;
use tonic::Code;

use crate::transport::TransportFailure;

/// Codes for failures detected on this side of the wire
pub mod codes {
    /// An update was requested without a profile
    pub const INVALID_ARGUMENT: &str = "invalid_argument";
    /// `OK` status without a payload, or a successful reply without a profile
    pub const EMPTY_RESPONSE: &str = "empty_response";
    /// `OK` status with bytes that do not decode as a `ThermalResponse`
    pub const MALFORMED_RESPONSE: &str = "malformed_response";
    /// The service answered but flagged the request as unsuccessful
    pub const SERVICE_REJECTED: &str = "service_rejected";
}

/// Exactly one of these is produced per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcOutcome<T = Profile> {
    Success(T),

    /// The service understood the call and refused it, or a local check failed
    ApplicationError { code: String, message: String },

    /// The call did not complete at the network or framing level
    TransportError { code: String, message: String },
}

impl<T> RpcOutcome<T> {
    pub fn application(code: impl Into<String>, message: impl Into<String>) -> Self {
        RpcOutcome::ApplicationError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn transport(code: impl Into<String>, message: impl Into<String>) -> Self {
        RpcOutcome::TransportError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RpcOutcome::Success(_))
    }

    /// The successful value, `None` for either error kind
    pub fn profile(&self) -> Option<&T> {
        match self {
            RpcOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Error code, `None` on success
    pub fn code(&self) -> Option<&str> {
        match self {
            RpcOutcome::Success(_) => None,
            RpcOutcome::ApplicationError { code, .. } | RpcOutcome::TransportError { code, .. } => {
                Some(code.as_str())
            }
        }
    }

    pub fn into_result(self) -> Result<T, OutcomeError> {
        match self {
            RpcOutcome::Success(value) => Ok(value),
            RpcOutcome::ApplicationError { code, message } => {
                Err(OutcomeError::Application { code, message })
            }
            RpcOutcome::TransportError { code, message } => {
                Err(OutcomeError::Transport { code, message })
            }
        }
    }
}

impl<T> From<TransportFailure> for RpcOutcome<T> {
    fn from(failure: TransportFailure) -> Self {
        RpcOutcome::transport(grpc_code_name(failure.code), failure.message)
    }
}

/// Failed outcome in `Result` form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    #[error("Thermal service error {code}: {message}")]
    Application { code: String, message: String },

    #[error("Thermal service unreachable ({code}): {message}")]
    Transport { code: String, message: String },
}

/// Canonical upper-snake name of a gRPC status code
pub fn grpc_code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}
