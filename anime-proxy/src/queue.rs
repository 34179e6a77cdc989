use crate::error::{Error, Result};
use crate::upstream::Payload;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Single-assignment slot a caller waits on
pub type ResultSink = oneshot::Sender<Result<Payload>>;

/// One pending endpoint key
#[derive(Debug)]
pub struct QueueItem {
    pub key: String,
    /// Upstream calls already issued for this item
    pub attempts: u32,
    pub enqueued_at: Instant,
}

impl QueueItem {
    fn new(key: String) -> Self {
        Self {
            key,
            attempts: 0,
            enqueued_at: Instant::now(),
        }
    }
}

#[derive(Default)]
struct QueueState {
    items: VecDeque<QueueItem>,
    /// Callers per pending key, covering both queued and in-flight items
    waiters: HashMap<String, Vec<ResultSink>>,
    running: bool,
}

/// Ordered stream of pending keys consumed by a single worker.
///
/// FIFO, except that [`RequestQueue::requeue`] puts a throttled item back at
/// the head. A key has at most one item in the queue or in flight; further
/// callers for that key join its waiter list.
#[derive(Default)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register `sink` for `key`, queueing the key at the tail unless it is
    /// already pending.
    ///
    /// Returns true when no worker is running and the caller has to start one.
    pub fn enqueue(&self, key: &str, sink: ResultSink) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        match state.waiters.entry(key.to_owned()) {
            Entry::Occupied(mut pending) => {
                log::debug!("Joining pending request for key: {}", key);
                pending.get_mut().push(sink);
            }
            Entry::Vacant(slot) => {
                slot.insert(vec![sink]);
                state.items.push_back(QueueItem::new(key.to_owned()));
                log::debug!("Queued key: {} ({} queued)", key, state.items.len());
            }
        }

        if state.running {
            false
        } else {
            state.running = true;
            true
        }
    }

    /// Pop the head item. On an empty queue the running flag is cleared
    /// under the same lock, so a concurrent `enqueue` starts a new worker.
    pub fn next(&self) -> Option<QueueItem> {
        let mut state = self.state();
        let item = state.items.pop_front();
        if item.is_none() {
            state.running = false;
        }
        item
    }

    /// Put a throttled item back at the head
    pub fn requeue(&self, item: QueueItem) {
        log::debug!(
            "Requeued key: {} at head after {} attempt(s)",
            item.key,
            item.attempts
        );
        self.state().items.push_front(item);
    }

    /// Deliver `result` to every caller waiting on `key`
    pub fn resolve(&self, key: &str, result: Result<Payload>) {
        let sinks = self.state().waiters.remove(key).unwrap_or_default();
        log::debug!("Resolving {} waiter(s) for key: {}", sinks.len(), key);
        for sink in sinks {
            // A caller that went away no longer needs its result.
            let _ = sink.send(result.clone());
        }
    }

    /// Fail every outstanding caller and mark the worker as stopped
    pub fn abort_all(&self, reason: &str) {
        let (items, waiters) = {
            let mut state = self.state();
            state.running = false;
            (
                std::mem::take(&mut state.items),
                std::mem::take(&mut state.waiters),
            )
        };
        log::warn!(
            "Aborting {} queued item(s) and {} pending key(s): {}",
            items.len(),
            waiters.len(),
            reason
        );
        for (key, sinks) in waiters {
            let error = Error::internal(key.as_str(), reason);
            for sink in sinks {
                let _ = sink.send(Err(error.clone()));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_running(&self) -> bool {
        self.state().running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn sink() -> (ResultSink, oneshot::Receiver<Result<Payload>>) {
        oneshot::channel()
    }

    #[tokio::test]
    async fn test_only_first_enqueue_starts_worker() {
        let queue = RequestQueue::new();
        let (a, _ra) = sink();
        let (b, _rb) = sink();

        assert!(queue.enqueue("/a", a));
        assert!(!queue.enqueue("/b", b));
        assert!(queue.is_running());
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_same_key_is_coalesced() {
        let queue = RequestQueue::new();
        let (a1, r1) = sink();
        let (a2, r2) = sink();

        queue.enqueue("/a", a1);
        queue.enqueue("/a", a2);
        assert_eq!(queue.len(), 1);

        let item = queue.next().unwrap();
        let payload: Payload = Arc::new(json!({ "data": [] }));
        queue.resolve(&item.key, Ok(payload.clone()));

        assert!(Arc::ptr_eq(&r1.await.unwrap().unwrap(), &payload));
        assert!(Arc::ptr_eq(&r2.await.unwrap().unwrap(), &payload));
    }

    #[tokio::test]
    async fn test_requeue_goes_to_head() {
        let queue = RequestQueue::new();
        let (a, _ra) = sink();
        let (b, _rb) = sink();
        queue.enqueue("/a", a);
        queue.enqueue("/b", b);

        let mut item = queue.next().unwrap();
        item.attempts += 1;
        queue.requeue(item);

        let head = queue.next().unwrap();
        assert_eq!(head.key, "/a");
        assert_eq!(head.attempts, 1);
        assert_eq!(queue.next().unwrap().key, "/b");
    }

    #[tokio::test]
    async fn test_empty_queue_stops_worker() {
        let queue = RequestQueue::new();
        let (a, _ra) = sink();
        queue.enqueue("/a", a);

        assert!(queue.next().is_some());
        assert!(queue.is_running());
        assert!(queue.next().is_none());
        assert!(!queue.is_running());

        let (b, _rb) = sink();
        assert!(queue.enqueue("/b", b));
    }

    #[tokio::test]
    async fn test_abort_all_fails_waiters() {
        let queue = RequestQueue::new();
        let (a, ra) = sink();
        queue.enqueue("/a", a);

        queue.abort_all("worker stopped");

        let error = ra.await.unwrap().unwrap_err();
        assert_eq!(error.status(), 500);
        assert_eq!(error.endpoint(), "/a");
        assert!(queue.is_empty());
        assert!(!queue.is_running());
    }
}
