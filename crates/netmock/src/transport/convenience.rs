//! One-call JSON expectations.

use super::core::MockTransport;
use crate::error::{MockError, TransportError};
use crate::message::HttpMessage;
use crate::request::ExactRequest;
use crate::responder::MockResponder;
use http::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

impl MockTransport {
    /// Expect `method url` with an optional JSON body and answer with `status`
    /// and a JSON body.
    ///
    /// The request is built with the transport's default headers; a JSON body
    /// also sets the JSON Content-Type, which the incoming request must carry.
    pub fn expect_json_request(
        &self,
        method: Method,
        url: &str,
        request_json: Option<&Value>,
        status: StatusCode,
        response_json: &Value,
    ) -> Result<Arc<ExactRequest>, MockError> {
        let mut request = self.json_request(method, url, request_json)?;
        request.set_responder(MockResponder::with_json(status, response_json)?);
        self.expect(request)
    }

    /// Expect `method url` with an optional JSON body and fail it with `error`.
    pub fn expect_json_error(
        &self,
        method: Method,
        url: &str,
        request_json: Option<&Value>,
        error: TransportError,
    ) -> Result<Arc<ExactRequest>, MockError> {
        let mut request = self.json_request(method, url, request_json)?;
        request.set_responder(MockResponder::with_error(error));
        self.expect(request)
    }

    pub fn expect_get(
        &self,
        url: &str,
        status: StatusCode,
        response_json: &Value,
    ) -> Result<Arc<ExactRequest>, MockError> {
        self.expect_json_request(Method::GET, url, None, status, response_json)
    }

    pub fn expect_post(
        &self,
        url: &str,
        request_json: &Value,
        status: StatusCode,
        response_json: &Value,
    ) -> Result<Arc<ExactRequest>, MockError> {
        self.expect_json_request(Method::POST, url, Some(request_json), status, response_json)
    }

    pub fn expect_put(
        &self,
        url: &str,
        request_json: &Value,
        status: StatusCode,
        response_json: &Value,
    ) -> Result<Arc<ExactRequest>, MockError> {
        self.expect_json_request(Method::PUT, url, Some(request_json), status, response_json)
    }

    pub fn expect_patch(
        &self,
        url: &str,
        request_json: &Value,
        status: StatusCode,
        response_json: &Value,
    ) -> Result<Arc<ExactRequest>, MockError> {
        self.expect_json_request(Method::PATCH, url, Some(request_json), status, response_json)
    }

    fn json_request(
        &self,
        method: Method,
        url: &str,
        request_json: Option<&Value>,
    ) -> Result<ExactRequest, MockError> {
        let mut request = self.mock_request(method, url)?;
        if let Some(json) = request_json {
            request.set_body_from_json(json)?;
        }
        Ok(request)
    }
}
