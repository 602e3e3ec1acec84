//! Thermal Connect: client-side gRPC connectivity for the device thermal service
//!
//! This crate lets a presentation layer read and replace the device's thermal
//! profile (fan curves, throttle plan) held by the local device-management
//! service.
//!
//! # Architecture
//!
//! - **ThermalConnector**: the two service operations, each yielding exactly one
//!   [`RpcOutcome`]. Failures are returned as data, never raised.
//! - **ThermalTransport**: the seam between the connector and the network.
//!   [`GrpcTransport`] speaks native gRPC over a lazily connected `tonic`
//!   channel, or grpc-web over HTTP/1.1 (see [`Framing`]);
//!   `MockTransport` (feature `mock`) scripts replies for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use thermal_connect::{Endpoint, RpcOutcome, ThermalConnector};
//!
//! async fn example() -> Result<(), thermal_connect::ConnectError> {
//!     let endpoint = Endpoint::parse("http://127.0.0.1:41959")?;
//!     let connector = ThermalConnector::new(endpoint)?;
//!
//!     match connector.get_current_profile().await {
//!         RpcOutcome::Success(profile) => println!("active profile: {}", profile.name),
//!         RpcOutcome::ApplicationError { code, message } => eprintln!("{code}: {message}"),
//!         RpcOutcome::TransportError { code, message } => eprintln!("{code}: {message}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod connector;
pub mod endpoint;
pub mod error;
pub mod grpc;
pub mod outcome;
pub mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use connector::ThermalConnector;
pub use endpoint::{Endpoint, DEFAULT_ENDPOINT};
pub use error::ConnectError;
pub use grpc::{Framing, GrpcTransport, TransportOptions};
pub use outcome::{codes, grpc_code_name, OutcomeError, RpcOutcome};
pub use transport::{CallEnvelope, ThermalMethod, ThermalTransport, TransportFailure};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReply, MockTransport, RecordedCall};

pub use thermal_proto::Profile;
pub use tonic::Code;
