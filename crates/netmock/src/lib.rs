//! netmock: programmable HTTP interception for tests.
//!
//! A [`MockTransport`] stands in for the network. Tests register expected
//! mock requests, each paired with a responder, and the transport matches
//! every outgoing request against them in registration order. The matched
//! responder then replays its canned response, possibly in delayed chunks,
//! through the same [`ClientSink`] notifications a real transport would
//! deliver. Serviced and unexpected requests are recorded for
//! verification.
//!
//! ```no_run
//! use netmock::{
//!     ExactRequest, IncomingRequest, InterceptingClient, MockResponder, MockTransport,
//!     StatusCode, TransportConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(MockTransport::with_config(TransportConfig {
//!     intercepts_all_requests: true,
//!     verification_enabled: true,
//!     ..TransportConfig::default()
//! })?);
//! transport.expect(
//!     ExactRequest::get("http://api.test/users/1")?
//!         .with_responder(MockResponder::with_status_and_body(StatusCode::OK, "{\"id\":1}")),
//! )?;
//!
//! let client = InterceptingClient::new(Arc::clone(&transport));
//! let response = client.fetch(IncomingRequest::get("http://api.test/users/1")?).await?;
//! assert_eq!(response.status(), StatusCode::OK);
//! transport.verify()?.into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod observability;
pub mod request;
pub mod responder;
pub mod transport;
pub mod verifier;

pub use client::{CompletedResponse, InterceptingClient};
pub use codec::{ParamValue, Params};
pub use config::TransportConfig;
pub use error::{ErrorCode, MockError, TransportError, VerificationError, ERROR_DOMAIN};
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
pub use message::{header_map, HttpMessage, MockMessage, TextEncoding};
pub use request::{
    canonical_url, ExactRequest, IncomingRequest, MatchPolicy, MockRequest, MockRequestRef,
    PathParams, PatternRequest, RemovalPolicy, RequestId, UrlPattern,
};
pub use responder::{
    ClientSink, Delivery, MockResponder, MockResponse, Responder, ResponderState, ResponseHead,
    ResponsePlan,
};
pub use transport::{Exchange, MockTransport, ServicedExchange, VerificationReport};
pub use verifier::{wait_for_condition, CallCounter, CountingSink, ExchangeVerifier};
