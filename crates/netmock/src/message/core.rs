//! Header and body storage shared by mock requests and mock responses.

use super::body::TextEncoding;
use super::headers::{self, parse_header};
use super::{FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::codec::{self, Params};
use crate::error::MockError;
use bytes::Bytes;
use http::header::{AsHeaderName, HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

/// Headers plus a buffered body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockMessage {
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl MockMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(headers: HeaderMap) -> Self {
        Self {
            headers,
            body: Bytes::new(),
        }
    }
}

/// Header and body accessors for anything that carries a [`MockMessage`].
///
/// Implementors supply the two message accessors; everything else is provided.
pub trait HttpMessage {
    fn message(&self) -> &MockMessage;
    fn message_mut(&mut self) -> &mut MockMessage;

    fn headers(&self) -> &HeaderMap {
        &self.message().headers
    }

    fn set_headers(&mut self, headers: HeaderMap) {
        self.message_mut().headers = headers;
    }

    /// Value of `field` as text; `None` when absent or not visible ASCII.
    fn header<K: AsHeaderName>(&self, field: K) -> Option<&str> {
        self.message().headers.get(field)?.to_str().ok()
    }

    /// Set a header given as text, replacing any value for the same field in any case.
    fn set_header(&mut self, field: &str, value: &str) -> Result<(), MockError> {
        let (name, value) = parse_header(field, value)?;
        self.message_mut().headers.insert(name, value);
        Ok(())
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.message_mut().headers.insert(name, value);
    }

    fn remove_header<K: AsHeaderName>(&mut self, field: K) -> Option<HeaderValue> {
        self.message_mut().headers.remove(field)
    }

    /// See [`headers_equal`](super::headers_equal).
    fn headers_equal(&self, other: Option<&HeaderMap>) -> bool {
        headers::headers_equal(&self.message().headers, other)
    }

    fn body(&self) -> &Bytes {
        &self.message().body
    }

    fn set_body(&mut self, body: Bytes) {
        self.message_mut().body = body;
    }

    /// Parse the body as JSON; `None` if it is not valid JSON.
    fn body_as_json(&self) -> Option<Value> {
        serde_json::from_slice(self.body()).ok()
    }

    /// Serialize `value` as the body, defaulting the Content-Type to JSON.
    fn set_body_from_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), MockError>
    where
        Self: Sized,
    {
        let body = serde_json::to_vec(value)?;
        let message = self.message_mut();
        message.body = Bytes::from(body);
        if !message.headers.contains_key(CONTENT_TYPE) {
            message
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        Ok(())
    }

    /// Decode the body as URL-encoded parameters; `None` if it does not decode.
    fn body_as_form_parameters(&self) -> Option<Params> {
        let text = std::str::from_utf8(self.body()).ok()?;
        codec::decode(text).ok()
    }

    /// Encode `params` as the body, defaulting the Content-Type to form encoding.
    fn set_body_from_form_parameters(&mut self, params: &Params) {
        let message = self.message_mut();
        message.body = Bytes::from(codec::encode(params));
        if !message.headers.contains_key(CONTENT_TYPE) {
            message
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }
    }

    fn body_as_string(&self, encoding: TextEncoding) -> Option<String> {
        encoding.decode(self.body())
    }

    fn set_body_from_string(&mut self, text: &str, encoding: TextEncoding) -> Result<(), MockError> {
        let body = encoding.encode(text)?;
        self.message_mut().body = Bytes::from(body);
        Ok(())
    }
}

impl HttpMessage for MockMessage {
    fn message(&self) -> &MockMessage {
        self
    }

    fn message_mut(&mut self) -> &mut MockMessage {
        self
    }
}
