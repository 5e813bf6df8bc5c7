use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::warn;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::blocker::IpBlocker;
use super::limiter::RateLimiter;
use crate::core::{Clock, SystemClock};

/// `blocked_by` recorded for automatic escalations
pub const SYSTEM_ACTOR: &str = "system";

/// When rate-limit violations turn into a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityPolicy {
    pub violation_threshold: u32,
    /// Violations older than this no longer count towards the threshold
    pub violation_period: Duration,
    pub block_duration: Duration,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            violation_threshold: 3,
            violation_period: Duration::from_secs(60 * 60),
            block_duration: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Terminal outcome for a request that may not proceed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityDenial {
    #[error("too many requests, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("source is blocked: {reason}")]
    Blocked { reason: String, remaining: Duration },
}

#[derive(Debug, Clone, Copy)]
struct ViolationRecord {
    period_start: Instant,
    count: u32,
}

/// Block table plus violation counters shared by every protected route
///
/// Each route brings its own `RateLimiter`; blocks and violations are
/// process-wide per IP.
pub struct SecurityGuard {
    blocker: IpBlocker,
    violations: DashMap<IpAddr, ViolationRecord>,
    policy: SecurityPolicy,
    clock: Arc<dyn Clock>,
}

impl SecurityGuard {
    pub fn new(policy: SecurityPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: SecurityPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            blocker: IpBlocker::with_clock(Arc::clone(&clock)),
            violations: DashMap::new(),
            policy,
            clock,
        }
    }

    pub fn blocker(&self) -> &IpBlocker {
        &self.blocker
    }

    pub fn policy(&self) -> SecurityPolicy {
        self.policy
    }

    /// Block table first, then the route's window counter
    ///
    /// A window denial records a violation; the request that reaches the
    /// threshold is still answered as rate limited, later ones hit the block.
    pub fn check(&self, limiter: &RateLimiter, ip: IpAddr) -> Result<(), SecurityDenial> {
        if let Some(entry) = self.blocker.get(ip) {
            return Err(SecurityDenial::Blocked {
                remaining: entry.remaining(self.clock.now()),
                reason: entry.reason,
            });
        }

        if limiter.allow(ip) {
            return Ok(());
        }

        self.record_violation(ip);
        Err(SecurityDenial::RateLimited {
            retry_after: limiter.retry_after(ip),
        })
    }

    /// Count a violation for `ip`; returns true if this one escalated to a block
    pub fn record_violation(&self, ip: IpAddr) -> bool {
        let now = self.clock.now();

        let reached = match self.violations.entry(ip) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if now.duration_since(record.period_start) >= self.policy.violation_period {
                    record.period_start = now;
                    record.count = 0;
                }
                record.count += 1;
                if record.count >= self.policy.violation_threshold {
                    entry.remove();
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                if self.policy.violation_threshold <= 1 {
                    true
                } else {
                    entry.insert(ViolationRecord {
                        period_start: now,
                        count: 1,
                    });
                    false
                }
            }
        };

        if reached {
            warn!(
                "Blocking {ip} for {:?} after {} rate limit violations",
                self.policy.block_duration, self.policy.violation_threshold
            );
            self.blocker.block(
                ip,
                format!(
                    "Exceeded rate limit {} times",
                    self.policy.violation_threshold
                ),
                SYSTEM_ACTOR,
                self.policy.block_duration,
            );
        }
        reached
    }

    /// Drop violation records whose period has lapsed, returning how many were removed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.violations.len();
        self.violations.retain(|_, record| {
            now.duration_since(record.period_start) < self.policy.violation_period
        });
        before.saturating_sub(self.violations.len())
    }

    /// Violations currently counted for `ip`
    pub fn violation_count(&self, ip: IpAddr) -> u32 {
        let now = self.clock.now();
        self.violations
            .get(&ip)
            .filter(|record| now.duration_since(record.period_start) < self.policy.violation_period)
            .map(|record| record.count)
            .unwrap_or(0)
    }
}
