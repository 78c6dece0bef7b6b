use crate::request::RequestId;
use crate::responder::{Delivery, ResponderState};
use tracing::debug;

/// Handle to an exchange the transport accepted.
///
/// Holds this exchange's own [`Delivery`], so cancelling one exchange never
/// touches another dispatch of the same responder. Dropping it does not cancel
/// delivery.
#[derive(Debug, Clone)]
pub struct Exchange {
    request_id: RequestId,
    delivery: Option<Delivery>,
}

impl Exchange {
    pub(crate) fn serviced(request_id: RequestId, delivery: Delivery) -> Self {
        Self {
            request_id,
            delivery: Some(delivery),
        }
    }

    pub(crate) fn unexpected(request_id: RequestId) -> Self {
        Self {
            request_id,
            delivery: None,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Whether an expected mock request serviced this exchange.
    pub fn was_expected(&self) -> bool {
        self.delivery.is_some()
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        self.delivery.as_ref()
    }

    /// Delivery state; `Idle` for an unexpected request.
    pub fn state(&self) -> ResponderState {
        self.delivery
            .as_ref()
            .map_or(ResponderState::Idle, Delivery::state)
    }

    /// Stop further notifications for this exchange. Returns whether delivery
    /// was still in progress.
    pub fn cancel(&self) -> bool {
        let Some(delivery) = &self.delivery else {
            return false;
        };
        let cancelled = delivery.cancel();
        if cancelled {
            debug!("Cancelled exchange {}", self.request_id);
        }
        cancelled
    }
}
