use super::types::ResponseHead;
use crate::error::TransportError;
use bytes::Bytes;
use url::Url;

/// Notifications a loading client receives for one exchange.
///
/// For a given exchange, calls arrive in order: one `did_receive_response`,
/// zero or more `did_receive_data`, then `did_finish_loading`. A failed
/// exchange gets a single `did_fail_with_error` instead. Calls may arrive on
/// any thread.
pub trait ClientSink: Send + Sync {
    fn did_receive_response(&self, response: &ResponseHead);
    fn did_receive_data(&self, data: Bytes);
    fn did_finish_loading(&self);
    fn did_fail_with_error(&self, error: &TransportError);

    fn was_redirected(&self, _location: &Url, _response: &ResponseHead) {}
}
