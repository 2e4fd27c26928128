//! Optional outgoing rate limit.
//!
//! [`RateGate`] admits at most `limit` calls per sliding `interval`. Waiters
//! queue on a fair mutex, so calls start in the order they arrived.
//! [`ThrottledFetch`] puts a gate in front of any [`Fetch`] implementation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::clients::errors::TransportError;
use crate::clients::fetch::{Fetch, FetchRequest, FetchResponse};
use crate::config::ThrottleConfig;

/// Sliding-window rate limiter.
#[derive(Debug)]
pub struct RateGate {
    limit: usize,
    interval: Duration,
    started: Mutex<VecDeque<Instant>>,
}

impl RateGate {
    /// Creates a gate admitting `limit` calls per `interval`.
    ///
    /// A `limit` of zero is treated as one.
    #[must_use]
    pub fn new(limit: u32, interval: Duration) -> Self {
        let limit = usize::try_from(limit.max(1)).unwrap_or(usize::MAX);
        Self {
            limit,
            interval,
            started: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    /// Waits until a call may start, then records it.
    ///
    /// The queue lock is held while waiting, which keeps later callers behind
    /// earlier ones.
    pub async fn acquire(&self) {
        let mut started = self.started.lock().await;
        loop {
            let now = Instant::now();
            while started
                .front()
                .is_some_and(|&at| now.duration_since(at) >= self.interval)
            {
                started.pop_front();
            }

            if started.len() < self.limit {
                started.push_back(now);
                return;
            }

            if let Some(&oldest) = started.front() {
                tracing::debug!("Throttle window full, waiting for a free slot");
                tokio::time::sleep_until(oldest + self.interval).await;
            }
        }
    }
}

/// A transport that waits on a [`RateGate`] before every call.
#[derive(Debug)]
pub struct ThrottledFetch {
    inner: Arc<dyn Fetch>,
    gate: RateGate,
}

impl ThrottledFetch {
    /// Wraps `inner` so that at most `limit` calls start per `interval`.
    #[must_use]
    pub fn new(inner: Arc<dyn Fetch>, limit: u32, interval: Duration) -> Self {
        Self {
            inner,
            gate: RateGate::new(limit, interval),
        }
    }
}

#[async_trait]
impl Fetch for ThrottledFetch {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        self.gate.acquire().await;
        self.inner.fetch(request).await
    }
}

/// Returns `base`, wrapped in a throttle gate when throttling is enabled.
#[must_use]
pub fn resolve_fetch(base: Arc<dyn Fetch>, throttle: &ThrottleConfig) -> Arc<dyn Fetch> {
    if throttle.enabled {
        Arc::new(ThrottledFetch::new(base, throttle.limit, throttle.interval))
    } else {
        base
    }
}
