//! MockTransport: registration, dispatch and lifecycle.

use super::exchange::Exchange;
use super::scheduler::Scheduler;
use super::state::{RegistryState, ServicedExchange};
use super::verify::VerificationReport;
use crate::config::TransportConfig;
use crate::error::{MockError, TransportError};
use crate::request::{identity, ExactRequest, IncomingRequest, MockRequest, MockRequestRef};
use crate::responder::ClientSink;
use http::{HeaderMap, Method};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Stand-in for the network transport during tests.
///
/// Each transport is an isolated registry; tests running in parallel can each
/// own one. Registry state sits behind one lock that is never held while a
/// responder runs or a mock request is matched, so matching predicates may call
/// back into the transport.
pub struct MockTransport {
    state: Mutex<RegistryState>,
    scheduler: Scheduler,
}

impl MockTransport {
    /// Create a transport with default settings.
    pub fn new() -> Result<Self, MockError> {
        Self::with_config(TransportConfig::default())
    }

    pub fn with_config(config: TransportConfig) -> Result<Self, MockError> {
        config.validate()?;
        let scheduler = Scheduler::new(config.scheduler_threads)?;
        info!(
            "Created mock transport (enabled={}, intercepts_all={}, verification={})",
            config.enabled, config.intercepts_all_requests, config.verification_enabled
        );
        Ok(Self {
            state: Mutex::new(RegistryState::new(&config)),
            scheduler,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn enable(&self) {
        let mut state = self.state.lock();
        if state.disposed {
            warn!("Ignoring enable() on a disposed mock transport");
            return;
        }
        state.enabled = true;
        info!("Mock transport enabled");
    }

    pub fn disable(&self) {
        self.state.lock().enabled = false;
        info!("Mock transport disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Forget serviced and unexpected requests. Expectations stay registered.
    pub fn reset(&self) {
        self.state.lock().clear_history();
        info!("Mock transport reset");
    }

    /// Forget everything, including expectations, and enable.
    pub fn reset_and_enable(&self) {
        self.clear_all();
        self.enable();
    }

    /// Forget everything, including expectations, and disable.
    pub fn reset_and_disable(&self) {
        self.clear_all();
        self.disable();
    }

    /// Clear all state, disable, and stop the delivery scheduler.
    ///
    /// Deliveries still in flight are abandoned.
    pub fn dispose(&self) {
        {
            let mut state = self.state.lock();
            state.expected.clear();
            state.clear_history();
            state.enabled = false;
            state.disposed = true;
        }
        self.scheduler.shutdown();
        info!("Mock transport disposed");
    }

    fn clear_all(&self) {
        let mut state = self.state.lock();
        state.expected.clear();
        state.clear_history();
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn intercepts_all_requests(&self) -> bool {
        self.state.lock().intercepts_all
    }

    pub fn set_intercepts_all_requests(&self, intercepts_all: bool) {
        self.state.lock().intercepts_all = intercepts_all;
    }

    pub fn automatically_removes_serviced_requests(&self) -> bool {
        self.state.lock().auto_remove
    }

    pub fn set_automatically_removes_serviced_requests(&self, auto_remove: bool) {
        self.state.lock().auto_remove = auto_remove;
    }

    pub fn verification_enabled(&self) -> bool {
        self.state.lock().verification_enabled
    }

    pub fn set_verification_enabled(&self, enabled: bool) {
        self.state.lock().verification_enabled = enabled;
    }

    pub fn default_headers(&self) -> HeaderMap {
        self.state.lock().default_headers.clone()
    }

    pub fn set_default_headers(&self, headers: HeaderMap) {
        self.state.lock().default_headers = headers;
    }

    /// Runtime responders deliver on. Custom responders spawn here too.
    pub fn scheduler(&self) -> &Handle {
        self.scheduler.handle()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Build an exact mock request carrying the transport's default headers.
    pub fn mock_request(&self, method: Method, url: &str) -> Result<ExactRequest, MockError> {
        let defaults = self.default_headers();
        Ok(ExactRequest::new(method, url)?.with_headers(&defaults))
    }

    /// Register `request` as expected and return a handle to it.
    pub fn expect<R: MockRequest + 'static>(&self, request: R) -> Result<Arc<R>, MockError> {
        let request = Arc::new(request);
        self.expect_shared(request.clone())?;
        Ok(request)
    }

    pub fn expect_shared(&self, request: MockRequestRef) -> Result<(), MockError> {
        request.validate()?;
        debug!("Expecting {}", request.describe());
        self.state.lock().expected.push(request);
        Ok(())
    }

    /// Unregister `request`. Returns whether it was registered.
    pub fn remove_expected<R: ?Sized>(&self, request: &Arc<R>) -> bool {
        let target = identity(request);
        let mut state = self.state.lock();
        let before = state.expected.len();
        state.expected.retain(|mock| identity(mock) != target);
        before != state.expected.len()
    }

    pub fn clear_expectations(&self) {
        self.state.lock().expected.clear();
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Expected mock requests in registration order.
    pub fn expected_requests(&self) -> Vec<MockRequestRef> {
        self.state.lock().expected.clone()
    }

    /// Distinct mock requests serviced since the last reset, in first-serviced order.
    pub fn serviced_requests(&self) -> Vec<MockRequestRef> {
        let state = self.state.lock();
        let mut distinct: Vec<MockRequestRef> = Vec::new();
        for exchange in state.serviced.values() {
            if !distinct.iter().any(|m| Arc::ptr_eq(m, &exchange.mock)) {
                distinct.push(Arc::clone(&exchange.mock));
            }
        }
        distinct
    }

    /// Every serviced exchange since the last reset, in servicing order.
    pub fn serviced_exchanges(&self) -> Vec<ServicedExchange> {
        self.state.lock().serviced.values().cloned().collect()
    }

    pub fn has_serviced<R: ?Sized>(&self, request: &Arc<R>) -> bool {
        self.state.lock().was_serviced(identity(request))
    }

    pub fn unexpected_requests(&self) -> Vec<IncomingRequest> {
        self.state.lock().unexpected.clone()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Whether [`handle`](Self::handle) would accept `request`.
    ///
    /// Matching may read the request body, which drains stream-backed bodies.
    pub fn should_intercept(&self, request: &IncomingRequest) -> bool {
        let expected = {
            let state = self.state.lock();
            if !state.enabled {
                return false;
            }
            if state.intercepts_all {
                return true;
            }
            state.expected.clone()
        };
        first_match(&expected, request).is_some()
    }

    /// Service `request`, delivering notifications to `sink`.
    ///
    /// The first expected mock request (in registration order) that matches
    /// wins. Without a match, the request is recorded as unexpected and `sink`
    /// receives an unexpected-request error right away, provided the transport
    /// intercepts all requests; otherwise `NotIntercepted` is returned and the
    /// sink is left untouched.
    ///
    /// Matching runs against a snapshot of the expected list taken outside the
    /// lock. If the winner was unregistered before it could be claimed, the
    /// match is retried against a fresh snapshot; a stream-backed body is
    /// already drained by then.
    pub fn handle(
        &self,
        request: IncomingRequest,
        sink: Arc<dyn ClientSink>,
    ) -> Result<Exchange, MockError> {
        let matched = loop {
            let expected = {
                let state = self.state.lock();
                if !state.enabled {
                    return Err(MockError::NotIntercepted(request.to_string()));
                }
                state.expected.clone()
            };
            let candidate = first_match(&expected, &request);

            let mut state = self.state.lock();
            if !state.enabled {
                return Err(MockError::NotIntercepted(request.to_string()));
            }
            match candidate {
                Some(mock) => {
                    let Some(index) = state.position_of(&mock) else {
                        debug!(
                            "{} was unregistered while matching {}, retrying",
                            mock.describe(),
                            request
                        );
                        continue;
                    };
                    state.serviced.insert(
                        request.id(),
                        ServicedExchange {
                            request: request.clone(),
                            mock: Arc::clone(&mock),
                        },
                    );
                    if state.should_remove(mock.as_ref()) {
                        state.expected.remove(index);
                        debug!("Removed serviced mock request {}", mock.describe());
                    }
                    break Some(mock);
                }
                None if state.intercepts_all => {
                    state.unexpected.push(request.clone());
                    break None;
                }
                None => return Err(MockError::NotIntercepted(request.to_string())),
            }
        };

        let Some(mock) = matched else {
            warn!("Unexpected request: {}", request);
            sink.did_fail_with_error(&TransportError::unexpected_request(&request));
            return Ok(Exchange::unexpected(request.id()));
        };

        debug!("Request {} matched {}", request, mock.describe());
        let responder = match mock.responder_for(&request) {
            Ok(responder) => responder,
            Err(e) => {
                sink.did_fail_with_error(&TransportError::missing_responder(&request));
                return Err(e);
            }
        };
        let delivery = responder.start(&request, sink, self.scheduler.handle());
        Ok(Exchange::serviced(request.id(), delivery))
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Report unexpected requests and expectations that were never serviced.
    ///
    /// Fails with [`MockError::VerificationDisabled`] unless verification is on.
    pub fn verify(&self) -> Result<VerificationReport, MockError> {
        let state = self.state.lock();
        if !state.verification_enabled {
            return Err(MockError::VerificationDisabled);
        }
        let unserviced_requests: Vec<MockRequestRef> = state
            .expected
            .iter()
            .filter(|mock| !state.was_serviced(identity(*mock)))
            .cloned()
            .collect();
        let report = VerificationReport {
            unexpected_requests: state.unexpected.clone(),
            unserviced_requests,
        };
        if !report.is_ok() {
            warn!(
                "Verification failed: {} unexpected, {} unserviced",
                report.unexpected_requests.len(),
                report.unserviced_requests.len()
            );
        }
        Ok(report)
    }
}

fn first_match(expected: &[MockRequestRef], request: &IncomingRequest) -> Option<MockRequestRef> {
    expected.iter().find(|mock| mock.matches(request)).cloned()
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockTransport")
            .field("enabled", &state.enabled)
            .field("expected", &state.expected.len())
            .field("serviced", &state.serviced.len())
            .field("unexpected", &state.unexpected.len())
            .finish()
    }
}
