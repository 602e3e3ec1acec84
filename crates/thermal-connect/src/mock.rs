//! Scripted transport for testing
//!
//! `MockTransport` answers each procedure with a reply set up ahead of time and
//! records every call it receives, so tests can check both what the connector
//! returned and what it put on the wire.

use async_trait::async_trait;
use bytes::Bytes;
use prost::Message;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thermal_proto::{Profile, ThermalResponse};
use tonic::Code;

use crate::transport::{CallEnvelope, ThermalMethod, ThermalTransport, TransportFailure};

/// What the mock answers a procedure with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// The peer completed the call
    Completed {
        status: Code,
        message: String,
        payload: Option<Bytes>,
    },
    /// The call never completed
    Failure(TransportFailure),
}

/// A call the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: ThermalMethod,
    pub request: Bytes,
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<ThermalMethod, MockReply>,
    calls: Vec<RecordedCall>,
}

/// In-memory transport for tests.
///
/// Clones share the same script and call log. A procedure without a scripted
/// reply fails with `UNAVAILABLE`.
///
/// # Example
///
/// ```rust,ignore
/// use thermal_connect::{MockTransport, ThermalConnector, ThermalMethod};
/// use thermal_proto::default_profile;
///
/// #[tokio::test]
/// async fn test_with_mock() {
///     let mock = MockTransport::new();
///     mock.reply_profile(ThermalMethod::GetCurrentProfile, default_profile("Quiet").unwrap());
///
///     let connector = ThermalConnector::with_transport(mock.clone());
///     assert!(connector.get_current_profile().await.is_success());
///     assert_eq!(mock.call_count(), 1);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_reply(&self, method: ThermalMethod, reply: MockReply) {
        self.state().replies.insert(method, reply);
    }

    /// Answer `OK` with the given payload bytes
    pub fn reply_ok(&self, method: ThermalMethod, payload: impl Into<Bytes>) {
        self.set_reply(
            method,
            MockReply::Completed {
                status: Code::Ok,
                message: String::new(),
                payload: Some(payload.into()),
            },
        );
    }

    /// Answer `OK` with a successful `ThermalResponse` carrying `profile`
    pub fn reply_profile(&self, method: ThermalMethod, profile: Profile) {
        let response = ThermalResponse {
            success: true,
            profile: Some(profile),
        };
        self.reply_ok(method, response.encode_to_vec());
    }

    /// Answer `OK` without sending any message
    pub fn reply_empty(&self, method: ThermalMethod) {
        self.set_reply(
            method,
            MockReply::Completed {
                status: Code::Ok,
                message: String::new(),
                payload: None,
            },
        );
    }

    /// Answer with a non-OK status
    pub fn reply_status(&self, method: ThermalMethod, status: Code, message: impl Into<String>) {
        self.set_reply(
            method,
            MockReply::Completed {
                status,
                message: message.into(),
                payload: None,
            },
        );
    }

    /// Fail the call at transport level
    pub fn fail(&self, method: ThermalMethod, code: Code, message: impl Into<String>) {
        self.set_reply(method, MockReply::Failure(TransportFailure::new(code, message)));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn reset(&self) {
        let mut state = self.state();
        state.replies.clear();
        state.calls.clear();
    }
}

#[async_trait]
impl ThermalTransport for MockTransport {
    async fn unary(
        &self,
        method: ThermalMethod,
        request: Bytes,
    ) -> Result<CallEnvelope, TransportFailure> {
        let reply = {
            let mut state = self.state();
            state.calls.push(RecordedCall {
                method,
                request: request.clone(),
            });
            state.replies.get(&method).cloned()
        };

        match reply {
            Some(MockReply::Completed {
                status,
                message,
                payload,
            }) => {
                let mut envelope = CallEnvelope::with_status(request, status, message);
                envelope.payload = payload;
                Ok(envelope)
            }
            Some(MockReply::Failure(failure)) => Err(failure),
            None => Err(TransportFailure::new(
                Code::Unavailable,
                format!("no reply scripted for {}", method),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_method_fails() {
        let mock = MockTransport::new();
        let err = mock
            .unary(ThermalMethod::GetCurrentProfile, Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, Code::Unavailable);
        assert!(err.message.contains("GetCurrentProfile"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_log() {
        let mock = MockTransport::new();
        let clone = mock.clone();
        clone.reply_empty(ThermalMethod::UpdateProfile);

        let envelope = mock
            .unary(ThermalMethod::UpdateProfile, Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert_eq!(envelope.status, Code::Ok);
        assert!(envelope.payload.is_none());
        assert_eq!(clone.calls()[0].request, Bytes::from_static(b"abc"));

        clone.reset();
        assert_eq!(mock.call_count(), 0);
    }
}
