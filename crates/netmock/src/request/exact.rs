//! Mock requests matched by exact method, URL, headers and body.

use super::canonical::{canonical_url, parse_url};
use super::incoming::IncomingRequest;
use super::types::MockRequest;
use crate::codec;
use crate::error::MockError;
use crate::message::{headers_equal, HttpMessage, MockMessage};
use crate::responder::{Responder, SharedResponder};
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Which parts of an incoming request an [`ExactRequest`] compares beyond method and URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub checks_headers: bool,
    pub checks_body: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            checks_headers: true,
            checks_body: true,
        }
    }
}

/// A mock request matching one specific method and URL.
///
/// Holds a single responder that is reused on every dispatch, so it is
/// intended to be serviced once.
#[derive(Debug, Clone)]
pub struct ExactRequest {
    method: Method,
    url: Url,
    canonical: Url,
    message: MockMessage,
    policy: MatchPolicy,
    responder: Option<SharedResponder>,
}

impl ExactRequest {
    pub fn new(method: Method, url: &str) -> Result<Self, MockError> {
        let url = parse_url(url)?;
        Ok(Self {
            method,
            canonical: canonical_url(&url),
            url,
            message: MockMessage::new(),
            policy: MatchPolicy::default(),
            responder: None,
        })
    }

    pub fn get(url: &str) -> Result<Self, MockError> {
        Self::new(Method::GET, url)
    }

    pub fn head(url: &str) -> Result<Self, MockError> {
        Self::new(Method::HEAD, url)
    }

    pub fn post(url: &str) -> Result<Self, MockError> {
        Self::new(Method::POST, url)
    }

    pub fn put(url: &str) -> Result<Self, MockError> {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: &str) -> Result<Self, MockError> {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: &str) -> Result<Self, MockError> {
        Self::new(Method::DELETE, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: MatchPolicy) {
        self.policy = policy;
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Merge `headers` into this request's headers, overwriting same-named fields.
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        self.message.headers.extend(headers.clone());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.message.body = body.into();
        self
    }

    pub fn with_json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, MockError> {
        self.set_body_from_json(value)?;
        Ok(self)
    }

    pub fn responder(&self) -> Option<&SharedResponder> {
        self.responder.as_ref()
    }

    pub fn set_responder(&mut self, responder: impl Responder + 'static) {
        self.responder = Some(Arc::new(responder));
    }

    pub fn set_shared_responder(&mut self, responder: SharedResponder) {
        self.responder = Some(responder);
    }

    pub fn with_responder(mut self, responder: impl Responder + 'static) -> Self {
        self.set_responder(responder);
        self
    }

    fn body_matches(&self, request: &IncomingRequest) -> bool {
        let incoming = request.body_bytes();
        let content_type = request.content_type().unwrap_or_default();

        if content_type.contains("application/json") {
            let ours = serde_json::from_slice::<Value>(&self.message.body);
            let theirs = serde_json::from_slice::<Value>(&incoming);
            if let (Ok(ours), Ok(theirs)) = (ours, theirs) {
                return ours == theirs;
            }
        } else if content_type.contains("application/x-www-form-urlencoded") {
            let ours = form_params(&self.message.body);
            let theirs = form_params(&incoming);
            if let (Some(ours), Some(theirs)) = (ours, theirs) {
                return ours == theirs;
            }
        }
        self.message.body == incoming
    }
}

fn form_params(body: &[u8]) -> Option<codec::Params> {
    codec::decode(std::str::from_utf8(body).ok()?).ok()
}

impl HttpMessage for ExactRequest {
    fn message(&self) -> &MockMessage {
        &self.message
    }

    fn message_mut(&mut self) -> &mut MockMessage {
        &mut self.message
    }
}

impl MockRequest for ExactRequest {
    fn matches(&self, request: &IncomingRequest) -> bool {
        if *request.method() != self.method {
            return false;
        }
        if canonical_url(request.url()) != self.canonical {
            return false;
        }
        if self.policy.checks_headers
            && !headers_equal(&self.message.headers, Some(request.headers()))
        {
            return false;
        }
        !self.policy.checks_body || self.body_matches(request)
    }

    fn responder_for(&self, _request: &IncomingRequest) -> Result<SharedResponder, MockError> {
        self.responder
            .clone()
            .ok_or_else(|| MockError::MissingResponder(self.describe()))
    }

    fn validate(&self) -> Result<(), MockError> {
        if self.responder.is_none() {
            return Err(MockError::invalid_argument(format!(
                "{} has no responder",
                self.describe()
            )));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}
