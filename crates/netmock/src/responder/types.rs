//! Response plan types.

use crate::error::TransportError;
use crate::message::{HttpMessage, MockMessage};
use http::{HeaderMap, StatusCode};
use std::num::NonZeroUsize;
use std::time::Duration;
use url::Url;

// ============================================================================
// Responses
// ============================================================================

/// Status line and headers delivered before any body data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
}

/// A canned HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub message: MockMessage,
}

impl MockResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: MockMessage::new(),
        }
    }
}

impl HttpMessage for MockResponse {
    fn message(&self) -> &MockMessage {
        &self.message
    }

    fn message_mut(&mut self) -> &mut MockMessage {
        &mut self.message
    }
}

// ============================================================================
// Plans
// ============================================================================

/// What a responder plays back.
#[derive(Debug, Clone)]
pub enum ResponsePlan {
    /// A single failure notification.
    Error(TransportError),
    /// The whole body in one data notification.
    Fixed(MockResponse),
    /// The body split into roughly `chunk_count_hint` pieces, `delay` apart.
    Chunked {
        response: MockResponse,
        chunk_count_hint: NonZeroUsize,
        delay: Duration,
    },
}

impl ResponsePlan {
    pub fn kind(&self) -> &'static str {
        match self {
            ResponsePlan::Error(_) => "error",
            ResponsePlan::Fixed(_) => "fixed",
            ResponsePlan::Chunked { .. } => "chunked",
        }
    }

    pub fn response(&self) -> Option<&MockResponse> {
        match self {
            ResponsePlan::Error(_) => None,
            ResponsePlan::Fixed(response) | ResponsePlan::Chunked { response, .. } => {
                Some(response)
            }
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// Lifecycle of a single dispatch. `Idle` means nothing was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponderState {
    Idle = 0,
    Responding = 1,
    Completed = 2,
    Cancelled = 3,
}

impl ResponderState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => ResponderState::Responding,
            2 => ResponderState::Completed,
            3 => ResponderState::Cancelled,
            _ => ResponderState::Idle,
        }
    }
}
