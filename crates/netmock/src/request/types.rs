//! The mock request abstraction.

use super::incoming::IncomingRequest;
use crate::error::MockError;
use crate::responder::SharedResponder;
use std::fmt;
use std::sync::Arc;

/// Whether a serviced mock request leaves the expected set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Removed when the transport auto-removes serviced requests or verification is on.
    FollowTransport,
    /// Never removed by servicing.
    Never,
    /// Always removed once serviced.
    AfterServicing,
}

/// A description of a request the code under test is expected to issue.
///
/// `matches` and `responder_for` may be called concurrently from several
/// threads, so implementations keep no per-dispatch state of their own.
pub trait MockRequest: Send + Sync + fmt::Debug {
    fn matches(&self, request: &IncomingRequest) -> bool;

    /// Responder that services `request`. Only called after `matches` returned true.
    fn responder_for(&self, request: &IncomingRequest) -> Result<SharedResponder, MockError>;

    fn removal_policy(&self) -> RemovalPolicy {
        RemovalPolicy::FollowTransport
    }

    /// Checked when the request is registered.
    fn validate(&self) -> Result<(), MockError> {
        Ok(())
    }

    /// Short human-readable description used in logs and verification errors.
    fn describe(&self) -> String;
}

/// Shared handle to a registered mock request. Identity is the allocation.
pub type MockRequestRef = Arc<dyn MockRequest>;

/// Address used to compare mock request identity across `Arc<T>` and `Arc<dyn MockRequest>`.
pub(crate) fn identity<R: ?Sized>(request: &Arc<R>) -> *const () {
    Arc::as_ptr(request) as *const ()
}
