//! GrpcTransport: ThermalTransport over gRPC or grpc-web
//!
//! Calls are framed here instead of through a generated client, so the
//! envelope reports exactly what the peer sent, including a missing message.
//! A status counts as the peer's answer only when the peer itself sent
//! `grpc-status`. Anything else that goes wrong on the way (refused
//! connection, timeout, a non-gRPC peer, broken framing) is a
//! [`TransportFailure`].

use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use http::header::{CONTENT_TYPE, TE};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tonic::metadata::MetadataMap;
use tonic::transport::Channel;
use tonic::{Code, Status};
use tonic_web::{GrpcWebCall, GrpcWebClientLayer};
use tower::{Layer, ServiceExt};
use tracing::{debug, trace};

use crate::endpoint::Endpoint;
use crate::error::ConnectError;
use crate::outcome::grpc_code_name;
use crate::transport::{CallEnvelope, ThermalMethod, ThermalTransport, TransportFailure};

/// Length-prefixed message header: compression flag plus big-endian length
const FRAME_HEADER_LEN: usize = 5;

const GRPC_CONTENT_TYPE: &str = "application/grpc";
const GRPC_STATUS: &str = "grpc-status";

/// Wire framing spoken to the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// Native gRPC over plaintext HTTP/2
    #[default]
    Grpc,

    /// grpc-web over HTTP/1.1, the framing the device service offers to
    /// browser front ends
    GrpcWeb,
}

/// Transport-level policy. Unset timeouts leave the call unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Limit on establishing the TCP connection
    pub connect_timeout: Option<Duration>,

    /// Limit on a whole call, connection included
    pub request_timeout: Option<Duration>,

    pub framing: Framing,
}

type WebClient = Client<HttpConnector, GrpcWebCall<Full<Bytes>>>;

/// Connection state, created on the first call
enum Backend {
    Native(Channel),
    Web(WebClient),
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Native(_) => f.write_str("Backend::Native"),
            Backend::Web(_) => f.write_str("Backend::Web"),
        }
    }
}

/// gRPC transport to the thermal service.
///
/// Construction only validates the target; the connection is set up on the
/// first call, so a transport can be built outside an async runtime. Cheap to
/// clone; clones share the underlying connection.
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    target: tonic::transport::Endpoint,
    endpoint: Endpoint,
    options: TransportOptions,
    backend: Arc<OnceCell<Backend>>,
}

impl GrpcTransport {
    pub fn new(endpoint: &Endpoint, options: &TransportOptions) -> Result<Self, ConnectError> {
        let mut target = tonic::transport::Endpoint::from_shared(endpoint.to_string())?;
        if let Some(timeout) = options.connect_timeout {
            target = target.connect_timeout(timeout);
        }

        debug!("Prepared {:?} transport to {}", options.framing, endpoint);

        Ok(Self {
            target,
            endpoint: endpoint.clone(),
            options: options.clone(),
            backend: Arc::new(OnceCell::new()),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    async fn backend(&self) -> &Backend {
        self.backend
            .get_or_init(|| async {
                match self.options.framing {
                    Framing::Grpc => Backend::Native(self.target.connect_lazy()),
                    Framing::GrpcWeb => {
                        let mut connector = HttpConnector::new();
                        connector.set_connect_timeout(self.options.connect_timeout);
                        Backend::Web(Client::builder(TokioExecutor::new()).build(connector))
                    }
                }
            })
            .await
    }

    async fn exchange(
        &self,
        method: ThermalMethod,
        request: Bytes,
    ) -> Result<CallEnvelope, TransportFailure> {
        let body = Full::new(frame(&request)?);

        match self.backend().await {
            Backend::Native(channel) => {
                let http_request = Request::builder()
                    .method(Method::POST)
                    .uri(method.path())
                    .header(CONTENT_TYPE, GRPC_CONTENT_TYPE)
                    .header(TE, "trailers")
                    .body(tonic::body::Body::new(body))
                    .map_err(|e| TransportFailure::new(Code::Internal, e.to_string()))?;

                let response = channel
                    .clone()
                    .oneshot(http_request)
                    .await
                    .map_err(|e| {
                        let status = Status::from_error(Box::new(e));
                        TransportFailure::new(status.code(), status.message())
                    })?;
                read_response(request, response).await
            }
            Backend::Web(client) => {
                let http_request = Request::builder()
                    .method(Method::POST)
                    .uri(format!("{}{}", self.endpoint, method.path()))
                    .header(CONTENT_TYPE, GRPC_CONTENT_TYPE)
                    .body(body)
                    .map_err(|e| TransportFailure::new(Code::Internal, e.to_string()))?;

                let response = GrpcWebClientLayer::new()
                    .layer(client.clone())
                    .oneshot(http_request)
                    .await
                    .map_err(|e| {
                        let code = if e.is_connect() {
                            Code::Unavailable
                        } else {
                            Code::Unknown
                        };
                        TransportFailure::new(code, error_chain(&e))
                    })?;
                read_response(request, response).await
            }
        }
    }
}

#[async_trait]
impl ThermalTransport for GrpcTransport {
    async fn unary(
        &self,
        method: ThermalMethod,
        request: Bytes,
    ) -> Result<CallEnvelope, TransportFailure> {
        trace!("{} -> {} ({} bytes)", method, self.endpoint, request.len());

        match self.options.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(method, request))
                .await
                .map_err(|_| {
                    TransportFailure::new(
                        Code::Cancelled,
                        format!("Timeout expired after {:?}", limit),
                    )
                })?,
            None => self.exchange(method, request).await,
        }
    }
}

/// Drain a response and sort it into a completed call or a transport failure.
async fn read_response<B>(
    request: Bytes,
    response: Response<B>,
) -> Result<CallEnvelope, TransportFailure>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Error + 'static,
{
    let (parts, body) = response.into_parts();
    let collected = body
        .collect()
        .await
        .map_err(|e| TransportFailure::new(Code::Unavailable, error_chain(&e)))?;
    let trailers = collected.trailers().cloned();

    settle(request, parts.status, parts.headers, collected.to_bytes(), trailers)
}

/// Classify a fully read response.
///
/// The HTTP layer and the message framing must be intact, and the peer must
/// have sent `grpc-status` (in the headers for a trailers-only reply,
/// otherwise in the trailers). Only then is the reply a completed call.
fn settle(
    request: Bytes,
    http_status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    trailers: Option<HeaderMap>,
) -> Result<CallEnvelope, TransportFailure> {
    if http_status != StatusCode::OK {
        return Err(TransportFailure::new(
            code_for_http_status(http_status),
            format!("Peer answered HTTP {} instead of a gRPC reply", http_status),
        ));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with(GRPC_CONTENT_TYPE) {
        return Err(TransportFailure::new(
            Code::Internal,
            format!("Peer is not a gRPC service (content-type '{}')", content_type),
        ));
    }

    let payload =
        unframe(body).map_err(|reason| TransportFailure::new(Code::Internal, reason))?;

    let trailers = if headers.contains_key(GRPC_STATUS) {
        headers.clone()
    } else {
        trailers.unwrap_or_default()
    };
    let code = match trailers.get(GRPC_STATUS) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i32>().ok())
            .map(Code::from_i32)
            .ok_or_else(|| {
                TransportFailure::new(Code::Internal, format!("Malformed grpc-status {:?}", value))
            })?,
        None => {
            return Err(TransportFailure::new(
                Code::Internal,
                "Peer closed the call without a grpc-status",
            ))
        }
    };

    let mut envelope = if code == Code::Ok {
        CallEnvelope::ok(request, payload)
    } else {
        let message = Status::from_header_map(&trailers)
            .map(|status| status.message().to_string())
            .unwrap_or_default();
        trace!("Peer answered {}: {}", grpc_code_name(code), message);
        CallEnvelope::with_status(request, code, message)
    };
    envelope.headers = MetadataMap::from_headers(headers);
    envelope.trailers = MetadataMap::from_headers(trailers);
    Ok(envelope)
}

/// Wrap an encoded request in a single uncompressed frame.
fn frame(message: &Bytes) -> Result<Bytes, TransportFailure> {
    let len = u32::try_from(message.len()).map_err(|_| {
        TransportFailure::new(Code::ResourceExhausted, "Request exceeds the frame size limit")
    })?;

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + message.len());
    buf.put_u8(0);
    buf.put_u32(len);
    buf.put_slice(message);
    Ok(buf.freeze())
}

/// Read the response message out of a framed body. A unary reply carries at
/// most one message; no compression is ever negotiated.
fn unframe(mut body: Bytes) -> Result<Option<Bytes>, String> {
    let mut message = None;

    while body.has_remaining() {
        if body.remaining() < FRAME_HEADER_LEN {
            return Err(format!(
                "Truncated frame header: {} of {} bytes",
                body.remaining(),
                FRAME_HEADER_LEN
            ));
        }

        let flag = body.get_u8();
        let len = body.get_u32() as usize;
        match flag {
            0 => {}
            1 => return Err("Compressed message received but no encoding was negotiated".into()),
            other => return Err(format!("Invalid compression flag {}", other)),
        }

        if body.remaining() < len {
            return Err(format!(
                "Truncated message: expected {} bytes, got {}",
                len,
                body.remaining()
            ));
        }

        if message.replace(body.split_to(len)).is_some() {
            return Err("More than one message in a unary reply".into());
        }
    }

    Ok(message)
}

/// gRPC code for a non-200 HTTP reply, after the gRPC HTTP mapping
fn code_for_http_status(status: StatusCode) -> Code {
    match status.as_u16() {
        400 => Code::Internal,
        401 => Code::Unauthenticated,
        403 => Code::PermissionDenied,
        404 => Code::Unimplemented,
        429 | 502 | 503 | 504 => Code::Unavailable,
        _ => Code::Unknown,
    }
}

fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
