//! Call counting through a typed decorator.
//!
//! Only calls that go through the decorator are counted. Calls made directly
//! on the wrapped value are invisible to the counter.

use crate::error::TransportError;
use crate::responder::{ClientSink, ResponseHead};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use url::Url;

/// Method names recorded by [`CountingSink`].
pub mod sink_methods {
    pub const DID_RECEIVE_RESPONSE: &str = "did_receive_response";
    pub const DID_RECEIVE_DATA: &str = "did_receive_data";
    pub const DID_FINISH_LOADING: &str = "did_finish_loading";
    pub const DID_FAIL_WITH_ERROR: &str = "did_fail_with_error";
    pub const WAS_REDIRECTED: &str = "was_redirected";
}

/// Per-method call counts.
#[derive(Debug, Default)]
pub struct CallCounter {
    counts: Mutex<HashMap<&'static str, usize>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, method: &'static str) {
        *self.counts.lock().entry(method).or_insert(0) += 1;
    }

    pub fn received_count(&self, method: &str) -> usize {
        self.counts.lock().get(method).copied().unwrap_or(0)
    }

    pub fn has_received(&self, method: &str) -> bool {
        self.received_count(method) > 0
    }

    pub fn total(&self) -> usize {
        self.counts.lock().values().sum()
    }

    pub fn reset(&self) {
        self.counts.lock().clear();
    }
}

/// A [`ClientSink`] that counts each notification before forwarding it to `inner`.
#[derive(Debug, Default)]
pub struct CountingSink<S> {
    inner: S,
    counter: CallCounter,
}

impl<S: ClientSink> CountingSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counter: CallCounter::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn counter(&self) -> &CallCounter {
        &self.counter
    }

    pub fn has_received(&self, method: &str) -> bool {
        self.counter.has_received(method)
    }

    pub fn received_count(&self, method: &str) -> usize {
        self.counter.received_count(method)
    }
}

impl<S: ClientSink> ClientSink for CountingSink<S> {
    fn did_receive_response(&self, response: &ResponseHead) {
        self.counter.record(sink_methods::DID_RECEIVE_RESPONSE);
        self.inner.did_receive_response(response);
    }

    fn did_receive_data(&self, data: Bytes) {
        self.counter.record(sink_methods::DID_RECEIVE_DATA);
        self.inner.did_receive_data(data);
    }

    fn did_finish_loading(&self) {
        self.counter.record(sink_methods::DID_FINISH_LOADING);
        self.inner.did_finish_loading();
    }

    fn did_fail_with_error(&self, error: &TransportError) {
        self.counter.record(sink_methods::DID_FAIL_WITH_ERROR);
        self.inner.did_fail_with_error(error);
    }

    fn was_redirected(&self, location: &Url, response: &ResponseHead) {
        self.counter.record(sink_methods::WAS_REDIRECTED);
        self.inner.was_redirected(location, response);
    }
}
