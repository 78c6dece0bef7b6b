use crate::error::TransportError;
use crate::responder::{ClientSink, ResponseHead};
use bytes::{Bytes, BytesMut};
use http::StatusCode;
use parking_lot::{Condvar, Mutex};
use serde_json::Value;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Recorded {
    response: Option<ResponseHead>,
    body: BytesMut,
    error: Option<TransportError>,
    complete: bool,
}

/// Records the notifications of a single exchange.
///
/// Use one verifier per exchange. Waiting never touches the transport lock,
/// so it is safe to block on one thread while deliveries run on another.
#[derive(Debug, Default)]
pub struct ExchangeVerifier {
    recorded: Mutex<Recorded>,
    completed: Condvar,
}

impl ExchangeVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the exchange finished loading or failed.
    pub fn is_complete(&self) -> bool {
        self.recorded.lock().complete
    }

    pub fn response(&self) -> Option<ResponseHead> {
        self.recorded.lock().response.clone()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.recorded.lock().response.as_ref().map(|r| r.status)
    }

    /// Body data received so far.
    pub fn body(&self) -> Bytes {
        Bytes::copy_from_slice(&self.recorded.lock().body)
    }

    pub fn body_as_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body()).ok()
    }

    pub fn error(&self) -> Option<TransportError> {
        self.recorded.lock().error.clone()
    }

    /// Block until the exchange completes.
    pub fn wait_for_completion(&self) {
        let mut recorded = self.recorded.lock();
        while !recorded.complete {
            self.completed.wait(&mut recorded);
        }
    }

    /// Block until the exchange completes or `timeout` elapses. Returns whether it completed.
    ///
    /// A timeout too large to express as a deadline waits without one.
    pub fn wait_for_completion_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_for_completion();
            return true;
        };
        let mut recorded = self.recorded.lock();
        while !recorded.complete {
            if self.completed.wait_until(&mut recorded, deadline).timed_out() {
                return recorded.complete;
            }
        }
        true
    }

    fn finish(&self, update: impl FnOnce(&mut Recorded)) {
        let mut recorded = self.recorded.lock();
        update(&mut *recorded);
        recorded.complete = true;
        self.completed.notify_all();
    }
}

impl ClientSink for ExchangeVerifier {
    fn did_receive_response(&self, response: &ResponseHead) {
        let mut recorded = self.recorded.lock();
        recorded.response = Some(response.clone());
        recorded.body.clear();
    }

    fn did_receive_data(&self, data: Bytes) {
        self.recorded.lock().body.extend_from_slice(&data);
    }

    fn did_finish_loading(&self) {
        self.finish(|_| {});
    }

    fn did_fail_with_error(&self, error: &TransportError) {
        let error = error.clone();
        self.finish(move |recorded| recorded.error = Some(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use url::Url;

    fn head(status: StatusCode) -> ResponseHead {
        ResponseHead {
            status,
            headers: Default::default(),
            url: Url::parse("http://example.com/").unwrap(),
        }
    }

    #[test]
    fn test_records_response_body_and_completion() {
        let verifier = ExchangeVerifier::new();
        verifier.did_receive_response(&head(StatusCode::OK));
        verifier.did_receive_data(Bytes::from_static(b"{\"a\":"));
        verifier.did_receive_data(Bytes::from_static(b"1}"));
        assert!(!verifier.is_complete());
        verifier.did_finish_loading();

        assert!(verifier.is_complete());
        assert_eq!(verifier.status(), Some(StatusCode::OK));
        assert_eq!(verifier.body_as_json(), Some(serde_json::json!({"a": 1})));
        assert!(verifier.error().is_none());
    }

    #[test]
    fn test_wait_times_out_without_completion() {
        let verifier = ExchangeVerifier::new();
        assert!(!verifier.wait_for_completion_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_wait_accepts_unbounded_timeout() {
        let verifier = Arc::new(ExchangeVerifier::new());
        let remote = Arc::clone(&verifier);
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            remote.did_finish_loading();
        });
        assert!(verifier.wait_for_completion_timeout(Duration::MAX));
        worker.join().unwrap();
    }

    #[test]
    fn test_wait_wakes_on_failure_from_another_thread() {
        let verifier = Arc::new(ExchangeVerifier::new());
        let remote = Arc::clone(&verifier);
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.did_fail_with_error(&TransportError::new("test", 5, "down"));
        });
        assert!(verifier.wait_for_completion_timeout(Duration::from_secs(5)));
        worker.join().unwrap();
        assert_eq!(verifier.error().map(|e| e.code), Some(5));
        assert!(verifier.response().is_none());
    }
}
