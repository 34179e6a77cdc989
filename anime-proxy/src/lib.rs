pub mod cache;
mod error;
pub mod governor;
pub mod queue;
mod upstream;
mod worker;


use cache::CacheStore;
use governor::RateGovernor;
use queue::RequestQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

pub use cache::CacheStats;
pub use error::{Error, ErrorKind, Result};
pub use upstream::{Payload, SurfUpstream, Upstream};

/// Tunables of the proxy core
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// How long a stored response is served without asking the upstream
    pub ttl: chrono::Duration,
    /// Minimum spacing between successive upstream calls
    pub spacing: Duration,
    /// Per-call upstream timeout
    pub request_timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::minutes(5),
            spacing: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(10),
        }
    }
}

pub(crate) struct Inner {
    cache: CacheStore,
    governor: RateGovernor,
    queue: RequestQueue,
    upstream: Arc<dyn Upstream>,
    request_timeout: Duration,
}

/// Cached, rate limited front for one upstream API.
///
/// Cache hits are answered inline. Misses are queued and served by a single
/// background worker, so at most one upstream call is ever in flight and
/// successive calls are spaced by [`ProxyConfig::spacing`]. Clones share the
/// same cache, queue and governor.
#[derive(Clone)]
pub struct ProxyClient {
    inner: Arc<Inner>,
}

impl ProxyClient {
    /// Proxy for an HTTP upstream rooted at `base_url`
    pub fn new(base_url: impl Into<String>, config: ProxyConfig) -> Self {
        Self::with_upstream(Arc::new(SurfUpstream::new(base_url)), config)
    }

    pub fn with_upstream(upstream: Arc<dyn Upstream>, config: ProxyConfig) -> Self {
        log::info!(
            "Initialized proxy (TTL: {}s, spacing: {:?}, timeout: {:?})",
            config.ttl.num_seconds(),
            config.spacing,
            config.request_timeout
        );
        Self {
            inner: Arc::new(Inner {
                cache: CacheStore::new(config.ttl),
                governor: RateGovernor::new(config.spacing),
                queue: RequestQueue::new(),
                upstream,
                request_timeout: config.request_timeout,
            }),
        }
    }

    /// Resolve `key` from cache or, on a miss, through the request queue.
    ///
    /// Needs a tokio runtime: the first miss spawns the queue worker.
    pub async fn fetch(&self, key: &str) -> Result<Payload> {
        if let Some(payload) = self.inner.cache.get_fresh(key) {
            return Ok(payload);
        }

        let (sink, pending) = oneshot::channel();
        if self.inner.queue.enqueue(key, sink) {
            tokio::spawn(worker::run(self.inner.clone()));
        }

        match pending.await {
            Ok(result) => result,
            Err(_) => Err(Error::internal(
                key,
                "request worker dropped the pending result",
            )),
        }
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// How long a stored response is served
    pub fn cache_ttl(&self) -> chrono::Duration {
        self.inner.cache.ttl()
    }

    /// Minimum spacing between upstream calls
    pub fn spacing(&self) -> Duration {
        self.inner.governor.spacing()
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Number of keys waiting for the worker
    pub fn queued(&self) -> usize {
        self.inner.queue.len()
    }
}
