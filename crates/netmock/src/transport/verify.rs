use crate::error::{ErrorCode, VerificationError};
use crate::request::{IncomingRequest, MockRequestRef};

/// Outcome of [`MockTransport::verify`](super::MockTransport::verify).
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub unexpected_requests: Vec<IncomingRequest>,
    pub unserviced_requests: Vec<MockRequestRef>,
}

impl VerificationReport {
    /// No unexpected requests and no unserviced expectations.
    pub fn is_ok(&self) -> bool {
        self.unexpected_requests.is_empty() && self.unserviced_requests.is_empty()
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.clone().into_error().codes()
    }

    pub fn into_result(self) -> Result<(), VerificationError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> VerificationError {
        VerificationError {
            unexpected_requests: self.unexpected_requests,
            unserviced_requests: self.unserviced_requests,
        }
    }
}
