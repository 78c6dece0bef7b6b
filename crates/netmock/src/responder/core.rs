//! The responder trait and the standard mock responder.

use super::delivery;
use super::sink::ClientSink;
use super::types::{MockResponse, ResponderState, ResponsePlan};
use crate::error::{MockError, TransportError};
use crate::message::HttpMessage;
use crate::request::IncomingRequest;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Plays back a response for a matched request.
pub trait Responder: Send + Sync + fmt::Debug {
    /// Begin delivering notifications to `sink` on `scheduler`. Returns immediately
    /// with the handle controlling this one dispatch.
    fn start(
        &self,
        request: &IncomingRequest,
        sink: Arc<dyn ClientSink>,
        scheduler: &Handle,
    ) -> Delivery;
}

/// Shared handle to a responder.
pub type SharedResponder = Arc<dyn Responder>;

#[derive(Debug)]
struct DeliveryState {
    state: AtomicU8,
    token: CancellationToken,
}

/// State and cancellation of a single dispatch.
///
/// Clones refer to the same dispatch. A delivery leaves `Responding` exactly
/// once, either by completing or by being cancelled.
#[derive(Debug, Clone)]
pub struct Delivery {
    inner: Arc<DeliveryState>,
}

impl Delivery {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DeliveryState {
                state: AtomicU8::new(ResponderState::Responding as u8),
                token: CancellationToken::new(),
            }),
        }
    }

    pub fn state(&self) -> ResponderState {
        ResponderState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Mark the dispatch completed. Returns `false` if it already left `Responding`.
    pub fn complete(&self) -> bool {
        self.transition(ResponderState::Completed)
    }

    /// Cancel the dispatch. Returns `false` if it already left `Responding`.
    pub fn cancel(&self) -> bool {
        let cancelled = self.transition(ResponderState::Cancelled);
        if cancelled {
            self.inner.token.cancel();
        }
        cancelled
    }

    fn transition(&self, to: ResponderState) -> bool {
        self.inner
            .state
            .compare_exchange(
                ResponderState::Responding as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for Delivery {
    fn default() -> Self {
        Self::new()
    }
}

/// Responder backed by a [`ResponsePlan`].
///
/// Re-dispatching the same instance starts an independent delivery, each with
/// its own [`Delivery`] handle.
#[derive(Debug)]
pub struct MockResponder {
    plan: Arc<ResponsePlan>,
    deliveries: Mutex<Vec<Delivery>>,
}

impl MockResponder {
    pub fn new(plan: ResponsePlan) -> Self {
        Self {
            plan: Arc::new(plan),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    /// Fail the exchange with `error`.
    pub fn with_error(error: TransportError) -> Self {
        Self::new(ResponsePlan::Error(error))
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self::from_response(MockResponse::new(status))
    }

    pub fn with_status_and_headers(status: StatusCode, headers: HeaderMap) -> Self {
        Self::with_response(status, headers, Bytes::new())
    }

    pub fn with_status_and_body(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::with_response(status, HeaderMap::new(), body)
    }

    pub fn with_response(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let mut response = MockResponse::new(status);
        response.message.headers = headers;
        response.message.body = body.into();
        Self::from_response(response)
    }

    /// Respond with `status` and `value` serialized as a JSON body.
    pub fn with_json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, MockError> {
        let mut response = MockResponse::new(status);
        response.set_body_from_json(value)?;
        Ok(Self::from_response(response))
    }

    /// Deliver the body in about `chunk_count_hint` pieces with `delay` between them.
    ///
    /// A hint of zero is rejected.
    pub fn chunked(
        status: StatusCode,
        headers: HeaderMap,
        body: impl Into<Bytes>,
        chunk_count_hint: usize,
        delay: Duration,
    ) -> Result<Self, MockError> {
        let chunk_count_hint = NonZeroUsize::new(chunk_count_hint)
            .ok_or_else(|| MockError::invalid_argument("chunk count hint must be positive"))?;
        let mut response = MockResponse::new(status);
        response.message.headers = headers;
        response.message.body = body.into();
        Ok(Self::new(ResponsePlan::Chunked {
            response,
            chunk_count_hint,
            delay,
        }))
    }

    pub fn from_response(response: MockResponse) -> Self {
        Self::new(ResponsePlan::Fixed(response))
    }

    pub fn plan(&self) -> &ResponsePlan {
        &self.plan
    }

    /// State of the most recent dispatch, or `Idle` if never started.
    pub fn state(&self) -> ResponderState {
        self.deliveries
            .lock()
            .last()
            .map_or(ResponderState::Idle, Delivery::state)
    }

    /// Cancel every dispatch still responding. Returns how many were cancelled.
    pub fn cancel(&self) -> usize {
        let cancelled = self
            .deliveries
            .lock()
            .iter()
            .filter(|delivery| delivery.cancel())
            .count();
        if cancelled > 0 {
            debug!("Cancelled {} {} response deliveries", cancelled, self.plan.kind());
        }
        cancelled
    }
}

impl Responder for MockResponder {
    fn start(
        &self,
        request: &IncomingRequest,
        sink: Arc<dyn ClientSink>,
        scheduler: &Handle,
    ) -> Delivery {
        let delivery = Delivery::new();
        {
            let mut deliveries = self.deliveries.lock();
            deliveries.retain(|d| d.state() == ResponderState::Responding);
            deliveries.push(delivery.clone());
        }

        let plan = Arc::clone(&self.plan);
        let url = request.url().clone();
        let task_delivery = delivery.clone();
        debug!("Starting {} response for {}", plan.kind(), request);

        scheduler.spawn(async move {
            delivery::deliver(&plan, &url, sink.as_ref(), &task_delivery).await;
        });
        delivery
    }
}
