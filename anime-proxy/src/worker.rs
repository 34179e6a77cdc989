use crate::error::{Error, Result};
use crate::queue::RequestQueue;
use crate::upstream::Payload;
use crate::Inner;
use std::sync::Arc;

/// Fails every pending caller if the worker future is dropped before it
/// drained the queue (panic or runtime shutdown).
struct DrainGuard<'a> {
    queue: &'a RequestQueue,
    armed: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.queue.abort_all("request worker stopped unexpectedly");
        }
    }
}

/// Drain the request queue, one upstream call at a time.
///
/// Must only be started by the caller that got `true` back from
/// [`RequestQueue::enqueue`].
pub(crate) async fn run(inner: Arc<Inner>) {
    let mut guard = DrainGuard {
        queue: &inner.queue,
        armed: true,
    };
    log::info!("Request worker started");

    let mut upstream_calls = 0u32;
    while let Some(mut item) = inner.queue.next() {
        // Another caller's request may have filled the cache since this key was queued.
        if let Some(payload) = inner.cache.get_fresh(&item.key) {
            inner.queue.resolve(&item.key, Ok(payload));
            continue;
        }

        inner.governor.wait_if_needed().await;
        item.attempts += 1;
        upstream_calls += 1;

        match call_upstream(&inner, &item.key).await {
            Ok(payload) => {
                inner.governor.record_success();
                inner.cache.put(&item.key, payload.clone());
                log::debug!(
                    "Fetched {} after {} attempt(s), {:?} since queued",
                    item.key,
                    item.attempts,
                    item.enqueued_at.elapsed()
                );
                inner.queue.resolve(&item.key, Ok(payload));
            }
            Err(err) if err.is_throttled() => {
                let spacing = inner.governor.spacing();
                log::warn!(
                    "Upstream throttled {} (attempt {}), retrying in {:?}",
                    item.key,
                    item.attempts,
                    spacing
                );
                inner.queue.requeue(item);
                tokio::time::sleep(spacing).await;
            }
            Err(err) => {
                log::warn!("Upstream request failed: {}", err);
                inner.queue.resolve(&item.key, Err(err));
            }
        }
    }

    guard.armed = false;
    log::info!("Request worker idle after {} upstream call(s)", upstream_calls);
}

async fn call_upstream(inner: &Inner, key: &str) -> Result<Payload> {
    match tokio::time::timeout(inner.request_timeout, inner.upstream.get(key)).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(key)),
    }
}
