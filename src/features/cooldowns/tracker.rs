use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{Clock, SystemClock};

/// (handler id, actor id)
type CooldownKey = (String, u64);

/// Longer cooldowns are clamped to this
pub const MAX_COOLDOWN: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Allowed,
    Denied { remaining_ms: u64 },
}

/// In-memory cooldown table keyed by handler and actor
///
/// The check and the write happen inside one `DashMap` entry guard, so two
/// concurrent invocations for the same key cannot both be allowed.
#[derive(Clone)]
pub struct CooldownTracker {
    expiries: Arc<DashMap<CooldownKey, Instant>>,
    clock: Arc<dyn Clock>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            expiries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Allow and start a new cooldown, or report the time left on the current one
    ///
    /// A denied attempt leaves the existing expiry untouched.
    pub fn check(&self, handler_id: &str, actor_id: u64, cooldown_seconds: u64) -> CooldownStatus {
        if cooldown_seconds == 0 {
            return CooldownStatus::Allowed;
        }

        let now = self.clock.now();
        let window = Duration::from_secs(cooldown_seconds).min(MAX_COOLDOWN);
        let expires_at = now.checked_add(window).unwrap_or(now);

        match self.expiries.entry((handler_id.to_string(), actor_id)) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if now < current {
                    CooldownStatus::Denied {
                        remaining_ms: ceil_millis(current - now),
                    }
                } else {
                    entry.insert(expires_at);
                    CooldownStatus::Allowed
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                CooldownStatus::Allowed
            }
        }
    }

    /// Time left without recording an attempt
    pub fn remaining(&self, handler_id: &str, actor_id: u64) -> Option<Duration> {
        let now = self.clock.now();
        self.expiries
            .get(&(handler_id.to_string(), actor_id))
            .and_then(|expires_at| expires_at.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    /// Drop every expired entry, returning how many were removed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.expiries.len();
        self.expiries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.expiries.len())
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}

// Rounds up so a denial never reports 0ms remaining
fn ceil_millis(duration: Duration) -> u64 {
    let millis = duration.as_millis() as u64;
    if duration.subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis + 1
    }
}
