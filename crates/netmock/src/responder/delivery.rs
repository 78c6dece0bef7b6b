//! Cancellable emission of a response plan.
//!
//! Every notification is preceded by a cancellation check, so nothing is
//! emitted once the delivery loop has observed a cancelled token. The
//! terminal notification is only sent after the delivery moved to `Completed`.

use super::core::Delivery;
use super::sink::ClientSink;
use super::types::{MockResponse, ResponseHead, ResponsePlan};
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Emit `plan` to `sink`. Returns `false` if delivery stopped on cancellation.
pub(crate) async fn deliver(
    plan: &ResponsePlan,
    url: &Url,
    sink: &dyn ClientSink,
    delivery: &Delivery,
) -> bool {
    match plan {
        ResponsePlan::Error(error) => {
            if !delivery.complete() {
                return false;
            }
            sink.did_fail_with_error(error);
            true
        }
        ResponsePlan::Fixed(response) => {
            stream(response, url, 1, Duration::ZERO, sink, delivery).await
        }
        ResponsePlan::Chunked {
            response,
            chunk_count_hint,
            delay,
        } => stream(response, url, chunk_count_hint.get(), *delay, sink, delivery).await,
    }
}

async fn stream(
    response: &MockResponse,
    url: &Url,
    chunk_count_hint: usize,
    delay: Duration,
    sink: &dyn ClientSink,
    delivery: &Delivery,
) -> bool {
    if delivery.is_cancelled() {
        return false;
    }
    sink.did_receive_response(&ResponseHead {
        status: response.status,
        headers: response.message.headers.clone(),
        url: url.clone(),
    });

    let chunks = split_chunks(&response.message.body, chunk_count_hint);
    let total = chunks.len();
    for (index, chunk) in chunks.into_iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::select! {
                _ = delivery.token().cancelled() => {
                    debug!("Delivery cancelled before chunk {}/{}", index + 1, total);
                    return false;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if delivery.is_cancelled() {
            return false;
        }
        sink.did_receive_data(chunk);
    }

    if !delivery.complete() {
        return false;
    }
    sink.did_finish_loading();
    true
}

/// Split `body` into at most `hint` chunks of equal size, the last one possibly shorter.
pub(crate) fn split_chunks(body: &Bytes, hint: usize) -> Vec<Bytes> {
    if body.is_empty() {
        return Vec::new();
    }
    let size = body.len().div_ceil(hint.max(1));
    (0..body.len())
        .step_by(size)
        .map(|start| body.slice(start..(start + size).min(body.len())))
        .collect()
}
