//! ThermalConnector: typed access to the thermal-profile service

use bytes::Bytes;
use prost::Message;
use thermal_proto::{Profile, ThermalResponse, UpdateProfileRequest};
use tonic::Code;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::ConnectError;
use crate::grpc::{GrpcTransport, TransportOptions};
use crate::outcome::{codes, grpc_code_name, RpcOutcome};
use crate::transport::{CallEnvelope, ThermalMethod, ThermalTransport};

/// Reads and replaces the device's thermal profile.
///
/// Every operation resolves to exactly one [`RpcOutcome`]; expected failures
/// are returned, never raised. The connector keeps no per-call state, so one
/// instance may serve any number of concurrent calls. Nothing is retried.
///
/// Hand the connector to whatever needs it (a CLI handler, a UI controller)
/// rather than storing it in a global.
#[derive(Debug, Clone)]
pub struct ThermalConnector<T = GrpcTransport> {
    transport: T,
}

impl ThermalConnector<GrpcTransport> {
    /// Connector speaking gRPC to `endpoint`. No I/O happens until the first
    /// call, so this works with or without a running Tokio runtime.
    pub fn new(endpoint: Endpoint) -> Result<Self, ConnectError> {
        Self::with_options(endpoint, TransportOptions::default())
    }

    pub fn with_options(endpoint: Endpoint, options: TransportOptions) -> Result<Self, ConnectError> {
        let transport = GrpcTransport::new(&endpoint, &options)?;
        Ok(Self::with_transport(transport))
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.transport.endpoint()
    }
}

impl<T: ThermalTransport> ThermalConnector<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the profile currently applied on the device.
    pub async fn get_current_profile(&self) -> RpcOutcome {
        self.call(ThermalMethod::GetCurrentProfile, Bytes::new(), None)
            .await
    }

    /// Replace the device profile.
    ///
    /// An absent profile is refused locally with `invalid_argument` and never
    /// reaches the network. On success the profile the service answered with
    /// is authoritative; if the service accepted the update without echoing a
    /// profile, the submitted one is returned.
    pub async fn update_profile(&self, profile: impl Into<Option<Profile>>) -> RpcOutcome {
        let Some(profile) = profile.into() else {
            warn!("Refusing UpdateProfile without a profile");
            return RpcOutcome::application(
                codes::INVALID_ARGUMENT,
                "a profile is required to update the thermal configuration",
            );
        };

        let request = UpdateProfileRequest {
            profile: Some(profile.clone()),
        };

        self.call(
            ThermalMethod::UpdateProfile,
            Bytes::from(request.encode_to_vec()),
            Some(profile),
        )
        .await
    }

    async fn call(
        &self,
        method: ThermalMethod,
        request: Bytes,
        submitted: Option<Profile>,
    ) -> RpcOutcome {
        debug!("Calling {} ({} request bytes)", method, request.len());

        let outcome = match self.transport.unary(method, request).await {
            Ok(envelope) => classify(envelope, submitted),
            Err(failure) => RpcOutcome::from(failure),
        };

        match &outcome {
            RpcOutcome::Success(profile) => {
                debug!("{} succeeded with profile '{}'", method, profile.name)
            }
            RpcOutcome::ApplicationError { code, message } => {
                warn!("{} failed: {} ({})", method, message, code)
            }
            RpcOutcome::TransportError { code, message } => {
                warn!("{} could not reach the service: {} ({})", method, message, code)
            }
        }

        outcome
    }
}

/// Turn a completed call into an outcome.
///
/// `fallback` stands in for a successful reply that carries no profile.
fn classify(envelope: CallEnvelope, fallback: Option<Profile>) -> RpcOutcome {
    if envelope.status != Code::Ok {
        return RpcOutcome::application(grpc_code_name(envelope.status), envelope.status_message);
    }

    let payload = match envelope.payload {
        Some(payload) if !payload.is_empty() => payload,
        _ => {
            return RpcOutcome::application(
                codes::EMPTY_RESPONSE,
                "service answered OK without a response payload",
            )
        }
    };

    let response = match ThermalResponse::decode(payload) {
        Ok(response) => response,
        Err(e) => {
            return RpcOutcome::application(
                codes::MALFORMED_RESPONSE,
                format!("undecodable ThermalResponse: {}", e),
            )
        }
    };

    if !response.success {
        return RpcOutcome::application(
            codes::SERVICE_REJECTED,
            "service reported the request as unsuccessful",
        );
    }

    match response.profile.or(fallback) {
        Some(profile) => RpcOutcome::Success(profile),
        None => RpcOutcome::application(
            codes::EMPTY_RESPONSE,
            "service answered without a profile",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use thermal_proto::{default_profile, FanTable};

    fn balanced() -> Profile {
        default_profile("Balanced").unwrap()
    }

    fn connector() -> (ThermalConnector<MockTransport>, MockTransport) {
        let mock = MockTransport::new();
        (ThermalConnector::with_transport(mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_get_decodes_profile() {
        let (connector, mock) = connector();
        mock.reply_profile(ThermalMethod::GetCurrentProfile, balanced());

        let outcome = connector.get_current_profile().await;
        assert_eq!(outcome, RpcOutcome::Success(balanced()));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, ThermalMethod::GetCurrentProfile);
        assert!(calls[0].request.is_empty());
    }

    #[tokio::test]
    async fn test_get_empty_payload_is_application_error() {
        let (connector, mock) = connector();
        mock.reply_empty(ThermalMethod::GetCurrentProfile);

        let outcome = connector.get_current_profile().await;
        assert_eq!(outcome.code(), Some(codes::EMPTY_RESPONSE));
        assert!(matches!(outcome, RpcOutcome::ApplicationError { .. }));
    }

    #[tokio::test]
    async fn test_get_zero_length_payload_is_application_error() {
        let (connector, mock) = connector();
        mock.reply_ok(ThermalMethod::GetCurrentProfile, Bytes::new());

        let outcome = connector.get_current_profile().await;
        assert_eq!(outcome.code(), Some(codes::EMPTY_RESPONSE));
    }

    #[tokio::test]
    async fn test_get_garbage_payload_is_malformed() {
        let (connector, mock) = connector();
        mock.reply_ok(ThermalMethod::GetCurrentProfile, Bytes::from_static(&[0xff, 0xff, 0xff]));

        let outcome = connector.get_current_profile().await;
        assert_eq!(outcome.code(), Some(codes::MALFORMED_RESPONSE));
    }

    #[tokio::test]
    async fn test_get_success_without_profile_is_empty_response() {
        let (connector, mock) = connector();
        let response = ThermalResponse {
            success: true,
            profile: None,
        };
        mock.reply_ok(ThermalMethod::GetCurrentProfile, response.encode_to_vec());

        let outcome = connector.get_current_profile().await;
        assert_eq!(outcome.code(), Some(codes::EMPTY_RESPONSE));
    }

    #[tokio::test]
    async fn test_get_unsuccessful_reply_is_rejected() {
        let (connector, mock) = connector();
        let response = ThermalResponse {
            success: false,
            profile: Some(balanced()),
        };
        mock.reply_ok(ThermalMethod::GetCurrentProfile, response.encode_to_vec());

        let outcome = connector.get_current_profile().await;
        assert_eq!(outcome.code(), Some(codes::SERVICE_REJECTED));
    }

    #[tokio::test]
    async fn test_get_permission_denied_passes_through() {
        let (connector, mock) = connector();
        mock.reply_status(ThermalMethod::GetCurrentProfile, Code::PermissionDenied, "denied");

        let outcome = connector.get_current_profile().await;
        assert_eq!(
            outcome,
            RpcOutcome::ApplicationError {
                code: "PERMISSION_DENIED".to_string(),
                message: "denied".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_get_transport_failure() {
        let (connector, mock) = connector();
        mock.fail(ThermalMethod::GetCurrentProfile, Code::Unavailable, "tcp connect error");

        let outcome = connector.get_current_profile().await;
        match outcome {
            RpcOutcome::TransportError { code, message } => {
                assert_eq!(code, "UNAVAILABLE");
                assert!(!message.is_empty());
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_without_profile_never_calls() {
        let (connector, mock) = connector();
        mock.reply_profile(ThermalMethod::UpdateProfile, balanced());

        let outcome = connector.update_profile(None::<Profile>).await;
        assert_eq!(outcome.code(), Some(codes::INVALID_ARGUMENT));
        assert!(matches!(outcome, RpcOutcome::ApplicationError { .. }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_encoded_request() {
        let (connector, mock) = connector();
        mock.reply_profile(ThermalMethod::UpdateProfile, balanced());

        let outcome = connector.update_profile(balanced()).await;
        assert!(outcome.is_success());

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, ThermalMethod::UpdateProfile);
        let sent = UpdateProfileRequest::decode(calls[0].request.clone()).unwrap();
        assert_eq!(sent.profile, Some(balanced()));
    }

    #[tokio::test]
    async fn test_update_returns_normalized_profile() {
        let (connector, mock) = connector();
        let mut normalized = balanced();
        normalized.gpu_fan_curve = Some(
            FanTable::parse("20c:5%,50c:10%,55c:10%,60c:10%,65c:34%,70c:51%,75c:61%,98c:61%")
                .unwrap(),
        );
        mock.reply_profile(ThermalMethod::UpdateProfile, normalized.clone());

        let outcome = connector.update_profile(balanced()).await;
        assert_eq!(outcome, RpcOutcome::Success(normalized));
    }

    #[tokio::test]
    async fn test_update_accepted_without_echo_returns_submitted() {
        let (connector, mock) = connector();
        let response = ThermalResponse {
            success: true,
            profile: None,
        };
        mock.reply_ok(ThermalMethod::UpdateProfile, response.encode_to_vec());

        let outcome = connector.update_profile(balanced()).await;
        assert_eq!(outcome, RpcOutcome::Success(balanced()));
    }

    #[tokio::test]
    async fn test_update_empty_payload_is_application_error() {
        let (connector, mock) = connector();
        mock.reply_empty(ThermalMethod::UpdateProfile);

        let outcome = connector.update_profile(balanced()).await;
        assert_eq!(outcome.code(), Some(codes::EMPTY_RESPONSE));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let (connector, mock) = connector();
        mock.reply_profile(ThermalMethod::GetCurrentProfile, balanced());
        mock.reply_status(ThermalMethod::UpdateProfile, Code::FailedPrecondition, "busy");

        let (read, write) = tokio::join!(
            connector.get_current_profile(),
            connector.update_profile(balanced())
        );
        assert!(read.is_success());
        assert_eq!(write.code(), Some("FAILED_PRECONDITION"));
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_grpc_connector_construction_without_runtime() {
        let connector = ThermalConnector::new(Endpoint::default()).unwrap();
        assert_eq!(connector.endpoint().to_string(), "http://127.0.0.1:41959");
    }
}
