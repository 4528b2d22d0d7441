//! Sliding-window rate limiting keyed by client address.
//!
//! Each client keeps the instants of its recent admitted requests. A request
//! is admitted when fewer than `max_requests` of those fall inside the
//! trailing window measured from the request's own arrival time.
//!
//! The key map is bounded: when a new client arrives at capacity, expired
//! windows are dropped first, then the least recently seen client.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Admission decision capability injected into the signup handler.
pub trait RateLimiter: Send + Sync {
    /// Decide whether a request from `key` arriving at `now` is admitted.
    fn admit(&self, key: &str, now: Instant) -> bool;

    /// Apply new limits after a configuration reload.
    fn reconfigure(&self, _config: &RateLimitConfig) {}

    /// Drop state that can no longer affect a decision. Returns entries removed.
    fn sweep(&self, _now: Instant) -> usize {
        0
    }
}

/// Limits derived from [`RateLimitConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub enabled: bool,
    pub window: Duration,
    pub max_requests: usize,
    pub max_keys: usize,
}

impl From<&RateLimitConfig> for WindowPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            max_keys: config.max_tracked_clients,
        }
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

struct ClientWindow {
    hits: VecDeque<Instant>,
    last_seen: Instant,
}

impl ClientWindow {
    fn new(now: Instant) -> Self {
        Self {
            hits: VecDeque::new(),
            last_seen: now,
        }
    }

    /// Drop hits at or beyond the window edge. `now` earlier than a stored hit
    /// counts as zero elapsed.
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) < window {
                break;
            }
            self.hits.pop_front();
        }
    }
}

struct Inner {
    policy: WindowPolicy,
    clients: HashMap<String, ClientWindow>,
}

/// Process-local sliding-window limiter.
pub struct SlidingWindowLimiter {
    inner: Mutex<Inner>,
}

impl SlidingWindowLimiter {
    pub fn new(policy: WindowPolicy) -> Self {
        Self {
            inner: Mutex::new(Inner {
                policy,
                clients: HashMap::new(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(WindowPolicy::from(config))
    }

    /// Number of client addresses currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.lock().clients.len()
    }

    pub fn policy(&self) -> WindowPolicy {
        self.lock().policy
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn make_room(inner: &mut Inner, now: Instant) {
        let window = inner.policy.window;
        inner.clients.retain(|_, client| {
            client.prune(now, window);
            !client.hits.is_empty()
        });

        while inner.clients.len() >= inner.policy.max_keys {
            let victim = inner
                .clients
                .iter()
                .min_by_key(|(_, client)| client.last_seen)
                .map(|(key, _)| key.clone());
            match victim {
                Some(key) => {
                    tracing::debug!(client = %key, "Evicting least recently seen client");
                    inner.clients.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(WindowPolicy::default())
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn admit(&self, key: &str, now: Instant) -> bool {
        let mut inner = self.lock();
        if !inner.policy.enabled {
            return true;
        }

        if !inner.clients.contains_key(key) && inner.clients.len() >= inner.policy.max_keys {
            Self::make_room(&mut inner, now);
        }

        let WindowPolicy {
            window,
            max_requests,
            ..
        } = inner.policy;

        let client = inner
            .clients
            .entry(key.to_string())
            .or_insert_with(|| ClientWindow::new(now));
        client.prune(now, window);
        client.last_seen = client.last_seen.max(now);

        let admitted = client.hits.len() < max_requests;
        if admitted {
            client.hits.push_back(now);
        }

        let tracked = inner.clients.len();
        drop(inner);
        metrics::record_tracked_clients(tracked);

        admitted
    }

    fn reconfigure(&self, config: &RateLimitConfig) {
        let policy = WindowPolicy::from(config);
        let mut inner = self.lock();
        if inner.policy != policy {
            tracing::info!(
                enabled = policy.enabled,
                window_secs = policy.window.as_secs(),
                max_requests = policy.max_requests,
                max_keys = policy.max_keys,
                "Rate limiter reconfigured"
            );
            inner.policy = policy;
        }
    }

    fn sweep(&self, now: Instant) -> usize {
        let mut inner = self.lock();
        let window = inner.policy.window;
        let before = inner.clients.len();
        inner.clients.retain(|_, client| {
            client.prune(now, window);
            !client.hits.is_empty()
        });
        let removed = before - inner.clients.len();
        let tracked = inner.clients.len();
        drop(inner);

        metrics::record_tracked_clients(tracked);
        removed
    }
}
