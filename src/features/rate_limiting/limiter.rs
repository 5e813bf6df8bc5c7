use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{Clock, SystemClock};

/// Limits for one protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl RateLimitConfig {
    pub fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            max_requests,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    window_start: Instant,
    request_count: u32,
}

/// Fixed-window request counter keyed by source IP
///
/// Each IP's window starts at its first request and rolls forward on the
/// first request after it has elapsed.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<IpAddr, WindowRecord>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        RateLimiter {
            windows: Arc::new(DashMap::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count one request from `ip`; false once the window holds more than `max_requests`
    pub fn allow(&self, ip: IpAddr) -> bool {
        let now = self.clock.now();
        let mut record = self.windows.entry(ip).or_insert(WindowRecord {
            window_start: now,
            request_count: 0,
        });

        if now.duration_since(record.window_start) >= self.config.window {
            record.window_start = now;
            record.request_count = 0;
        }

        record.request_count = record.request_count.saturating_add(1);
        record.request_count <= self.config.max_requests
    }

    /// Time until the current window for `ip` resets
    pub fn retry_after(&self, ip: IpAddr) -> Duration {
        let now = self.clock.now();
        self.windows
            .get(&ip)
            .map(|record| {
                (record.window_start + self.config.window).saturating_duration_since(now)
            })
            .unwrap_or_default()
    }

    /// Drop windows that have fully elapsed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        let window = self.config.window;
        self.windows
            .retain(|_, record| now.duration_since(record.window_start) < window);
        before.saturating_sub(self.windows.len())
    }
}
