//! Registry state. Every field is read and written under the transport lock.

use crate::config::TransportConfig;
use crate::request::{identity, IncomingRequest, MockRequest, MockRequestRef, RemovalPolicy, RequestId};
use http::HeaderMap;
use indexmap::IndexMap;

/// An incoming request and the mock request that serviced it.
#[derive(Debug, Clone)]
pub struct ServicedExchange {
    pub request: IncomingRequest,
    pub mock: MockRequestRef,
}

#[derive(Debug)]
pub(crate) struct RegistryState {
    pub enabled: bool,
    pub disposed: bool,
    pub intercepts_all: bool,
    pub auto_remove: bool,
    pub verification_enabled: bool,
    pub default_headers: HeaderMap,
    /// In registration order; the first match wins.
    pub expected: Vec<MockRequestRef>,
    pub serviced: IndexMap<RequestId, ServicedExchange>,
    pub unexpected: Vec<IncomingRequest>,
}

impl RegistryState {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            enabled: config.enabled,
            disposed: false,
            intercepts_all: config.intercepts_all_requests,
            auto_remove: config.automatically_removes_serviced_requests,
            verification_enabled: config.verification_enabled,
            default_headers: config.default_headers.clone(),
            expected: Vec::new(),
            serviced: IndexMap::new(),
            unexpected: Vec::new(),
        }
    }

    /// Position of `mock` in the expected list, compared by identity.
    pub fn position_of(&self, mock: &MockRequestRef) -> Option<usize> {
        let target = identity(mock);
        self.expected.iter().position(|m| identity(m) == target)
    }

    pub fn should_remove(&self, mock: &dyn MockRequest) -> bool {
        match mock.removal_policy() {
            RemovalPolicy::Never => false,
            RemovalPolicy::AfterServicing => true,
            RemovalPolicy::FollowTransport => self.auto_remove || self.verification_enabled,
        }
    }

    pub fn was_serviced(&self, mock: *const ()) -> bool {
        self.serviced
            .values()
            .any(|exchange| identity(&exchange.mock) == mock)
    }

    pub fn clear_history(&mut self) {
        self.serviced.clear();
        self.unexpected.clear();
    }
}
