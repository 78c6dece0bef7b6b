//! Error types for netmock.
//!
//! Three families live here:
//! - [`MockError`]: misuse and configuration failures returned synchronously by the API.
//! - [`TransportError`]: the error value a responder delivers to a client sink.
//! - [`VerificationError`]: the post-hoc verification failure with its two stable codes.

use crate::request::{IncomingRequest, MockRequestRef};
use std::fmt;

/// Error domain shared by every error netmock itself produces.
pub const ERROR_DOMAIN: &str = "netmock";

/// Stable error codes within [`ERROR_DOMAIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A request arrived that no expected mock request matched.
    UnexpectedRequest = 1,
    /// An expected mock request was never serviced.
    UnservicedRequest = 2,
    /// A request reached the client but the transport declined to intercept it.
    NotIntercepted = 3,
    /// The matched mock request could not produce a responder.
    MissingResponder = 4,
    /// A responder finished loading without first sending a response.
    IncompleteResponse = 5,
}

impl ErrorCode {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// Errors returned by the netmock API.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header '{field}': {reason}")]
    InvalidHeader { field: String, reason: String },
    #[error("Invalid URL pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("No responder available for {0}")]
    MissingResponder(String),
    #[error("Verification is not enabled on this transport")]
    VerificationDisabled,
    #[error("Request {0} was not intercepted")]
    NotIntercepted(String),
    #[error("Failed to start delivery scheduler: {0}")]
    Scheduler(#[source] std::io::Error),
    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[source] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
    #[error("Failed to serialize JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

impl MockError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        MockError::InvalidArgument(message.into())
    }
}

/// Error delivered to a client sink in place of a response.
///
/// Responders hold one of these when configured to fail, and the transport
/// synthesizes one for unexpected requests. Cloned on every delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub domain: String,
    pub code: i64,
    pub message: String,
}

impl TransportError {
    pub fn new(domain: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }

    /// Error synthesized for a request no expectation matched.
    pub fn unexpected_request(request: &IncomingRequest) -> Self {
        Self::new(
            ERROR_DOMAIN,
            ErrorCode::UnexpectedRequest.as_i64(),
            format!("Unexpected request received: {request}"),
        )
    }

    /// Error delivered by the intercepting client when the transport declines a request.
    pub fn not_intercepted(request: &IncomingRequest) -> Self {
        Self::new(
            ERROR_DOMAIN,
            ErrorCode::NotIntercepted.as_i64(),
            format!("Request was not intercepted and no network is available: {request}"),
        )
    }

    /// Error delivered when the matched mock request produced no responder.
    pub fn missing_responder(request: &IncomingRequest) -> Self {
        Self::new(
            ERROR_DOMAIN,
            ErrorCode::MissingResponder.as_i64(),
            format!("No responder available for {request}"),
        )
    }

    pub fn is_code(&self, code: ErrorCode) -> bool {
        self.domain == ERROR_DOMAIN && self.code == code.as_i64()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.domain, self.code, self.message)
    }
}

impl std::error::Error for TransportError {}

/// Verification failure: unexpected requests, unserviced expectations, or both.
#[derive(Debug, Clone)]
pub struct VerificationError {
    pub unexpected_requests: Vec<IncomingRequest>,
    pub unserviced_requests: Vec<MockRequestRef>,
}

impl VerificationError {
    pub fn domain(&self) -> &'static str {
        ERROR_DOMAIN
    }

    /// Codes carried by this failure, in code order.
    pub fn codes(&self) -> Vec<ErrorCode> {
        let mut codes = Vec::with_capacity(2);
        if !self.unexpected_requests.is_empty() {
            codes.push(ErrorCode::UnexpectedRequest);
        }
        if !self.unserviced_requests.is_empty() {
            codes.push(ErrorCode::UnservicedRequest);
        }
        codes
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.codes().contains(&code)
    }

    fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if !self.unexpected_requests.is_empty() {
            let listed: Vec<String> = self
                .unexpected_requests
                .iter()
                .map(ToString::to_string)
                .collect();
            parts.push(format!(
                "{} unexpected request(s): {}",
                listed.len(),
                listed.join(", ")
            ));
        }
        if !self.unserviced_requests.is_empty() {
            let listed: Vec<String> = self
                .unserviced_requests
                .iter()
                .map(|r| r.describe())
                .collect();
            parts.push(format!(
                "{} expected request(s) never serviced: {}",
                listed.len(),
                listed.join(", ")
            ));
        }
        format!("{ERROR_DOMAIN} verification failed: {}", parts.join("; "))
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl std::error::Error for VerificationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ErrorCode::UnexpectedRequest.as_i64(), 1);
        assert_eq!(ErrorCode::UnservicedRequest.as_i64(), 2);
        assert_eq!(ErrorCode::NotIntercepted.as_i64(), 3);
        assert_eq!(ErrorCode::MissingResponder.as_i64(), 4);
    }

    #[test]
    fn test_transport_error_display_and_code() {
        let err = TransportError::new("custom", 42, "boom");
        assert_eq!(err.to_string(), "custom (42): boom");
        assert!(!err.is_code(ErrorCode::UnexpectedRequest));

        let ours = TransportError::new(ERROR_DOMAIN, 1, "x");
        assert!(ours.is_code(ErrorCode::UnexpectedRequest));
    }

    #[test]
    fn test_empty_verification_error_has_no_codes() {
        let err = VerificationError {
            unexpected_requests: vec![],
            unserviced_requests: vec![],
        };
        assert!(err.codes().is_empty());
        assert_eq!(err.domain(), ERROR_DOMAIN);
    }
}
