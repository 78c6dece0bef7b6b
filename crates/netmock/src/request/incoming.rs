//! Requests issued by the code under test.

use super::canonical::parse_url;
use crate::codec::{self, Params};
use crate::error::MockError;
use crate::message::{RequestBody, TextEncoding, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use bytes::Bytes;
use http::header::{AsHeaderName, HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an incoming request. Clones of a request share its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An outgoing request as seen by the transport.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    id: RequestId,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: RequestBody,
}

impl IncomingRequest {
    pub fn new(method: Method, url: &str) -> Result<Self, MockError> {
        Ok(Self::from_url(method, parse_url(url)?))
    }

    pub fn from_url(method: Method, url: Url) -> Self {
        Self {
            id: RequestId::next(),
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: &str) -> Result<Self, MockError> {
        Self::new(Method::GET, url)
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

    pub fn head(url: &str) -> Result<Self, MockError> {
        Self::new(Method::HEAD, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = RequestBody::Bytes(body.into());
        self
    }

    /// Attach a stream-backed body. See [`RequestBody`] for the single-read caveat.
    pub fn with_body_stream(mut self, reader: impl Read + Send + 'static) -> Self {
        self.body = RequestBody::from_stream(reader);
        self
    }

    /// Serialize `value` as a JSON body, defaulting the Content-Type.
    pub fn with_json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, MockError> {
        self.body = RequestBody::Bytes(Bytes::from(serde_json::to_vec(value)?));
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        Ok(self)
    }

    /// Encode `params` as a form body, defaulting the Content-Type.
    pub fn with_form_body(mut self, params: &Params) -> Self {
        self.body = RequestBody::Bytes(Bytes::from(codec::encode(params)));
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of `field` as text; `None` when absent or not visible ASCII.
    pub fn header<K: AsHeaderName>(&self, field: K) -> Option<&str> {
        self.headers.get(field)?.to_str().ok()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Body bytes. Drains a stream-backed body.
    pub fn body_bytes(&self) -> Bytes {
        self.body.read()
    }

    pub fn body_as_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body_bytes()).ok()
    }

    pub fn body_as_form_parameters(&self) -> Option<Params> {
        let bytes = self.body_bytes();
        let text = std::str::from_utf8(&bytes).ok()?;
        codec::decode(text).ok()
    }

    pub fn body_as_string(&self, encoding: TextEncoding) -> Option<String> {
        encoding.decode(&self.body_bytes())
    }
}

impl fmt::Display for IncomingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
