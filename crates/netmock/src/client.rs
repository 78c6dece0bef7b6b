//! A minimal loading client wired to a [`MockTransport`].
//!
//! It plays the role of the platform's loading stack: requests the transport
//! declines fail with a "not intercepted" error, since there is no network.

use crate::error::{ErrorCode, MockError, TransportError, ERROR_DOMAIN};
use crate::request::IncomingRequest;
use crate::responder::{ClientSink, ResponseHead};
use crate::transport::{Exchange, MockTransport};
use bytes::{Bytes, BytesMut};
use http::StatusCode;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// Response collected by [`InterceptingClient::fetch`].
#[derive(Debug, Clone)]
pub struct CompletedResponse {
    pub head: ResponseHead,
    pub body: Bytes,
}

impl CompletedResponse {
    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    pub fn text(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(str::to_owned)
    }
}

#[derive(Clone)]
pub struct InterceptingClient {
    transport: Arc<MockTransport>,
}

impl InterceptingClient {
    pub fn new(transport: Arc<MockTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<MockTransport> {
        &self.transport
    }

    /// Send `request`, reporting its outcome to `sink`.
    ///
    /// Returns the exchange when the transport accepted the request. The
    /// request is matched once, so stream-backed bodies survive until the
    /// matcher reads them.
    pub fn send(&self, request: IncomingRequest, sink: Arc<dyn ClientSink>) -> Option<Exchange> {
        let not_intercepted = TransportError::not_intercepted(&request);
        match self.transport.handle(request, Arc::clone(&sink)) {
            Ok(exchange) => Some(exchange),
            Err(MockError::NotIntercepted(description)) => {
                debug!("Transport declined {}", description);
                sink.did_fail_with_error(&not_intercepted);
                None
            }
            // The transport already reported the failure to the sink.
            Err(e) => {
                debug!("Dispatch failed: {}", e);
                None
            }
        }
    }

    /// Send `request` and wait for the whole response.
    pub async fn fetch(
        &self,
        request: IncomingRequest,
    ) -> Result<CompletedResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        let sink = Arc::new(CollectingSink::new(tx));
        let _exchange = self.send(request, sink);
        rx.await.unwrap_or_else(|_| {
            Err(TransportError::new(
                ERROR_DOMAIN,
                ErrorCode::IncompleteResponse.as_i64(),
                "Exchange ended without a terminal notification",
            ))
        })
    }
}

type Completion = oneshot::Sender<Result<CompletedResponse, TransportError>>;

struct CollectingSink {
    state: Mutex<Collecting>,
}

struct Collecting {
    head: Option<ResponseHead>,
    body: BytesMut,
    done: Option<Completion>,
}

impl CollectingSink {
    fn new(done: Completion) -> Self {
        Self {
            state: Mutex::new(Collecting {
                head: None,
                body: BytesMut::new(),
                done: Some(done),
            }),
        }
    }

    fn complete(
        &self,
        result: impl FnOnce(&mut Collecting) -> Result<CompletedResponse, TransportError>,
    ) {
        let mut state = self.state.lock();
        let outcome = result(&mut *state);
        if let Some(done) = state.done.take() {
            // The fetch future may have been dropped.
            let _ = done.send(outcome);
        }
    }
}

impl ClientSink for CollectingSink {
    fn did_receive_response(&self, response: &ResponseHead) {
        let mut state = self.state.lock();
        state.head = Some(response.clone());
        state.body.clear();
    }

    fn did_receive_data(&self, data: Bytes) {
        self.state.lock().body.extend_from_slice(&data);
    }

    fn did_finish_loading(&self) {
        self.complete(|state| match state.head.take() {
            Some(head) => Ok(CompletedResponse {
                head,
                body: std::mem::take(&mut state.body).freeze(),
            }),
            None => Err(TransportError::new(
                ERROR_DOMAIN,
                ErrorCode::IncompleteResponse.as_i64(),
                "Finished loading without a response",
            )),
        });
    }

    fn did_fail_with_error(&self, error: &TransportError) {
        let error = error.clone();
        self.complete(move |_| Err(error));
    }
}
