use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{Clock, SystemClock};

/// Longest block the table will record; longer requests are clamped
pub const MAX_BLOCK_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// One blocked source IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    pub ip: IpAddr,
    pub reason: String,
    /// "system" for automatic escalation, otherwise the id of whoever blocked it
    pub blocked_by: String,
    pub blocked_at: DateTime<Utc>,
    pub expires_at: Instant,
}

impl BlockEntry {
    /// Time left on the block as seen at `now`
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

/// Timed IP block table
///
/// Expired blocks are released lazily, on lookup; nothing sweeps them in the
/// background.
#[derive(Clone)]
pub struct IpBlocker {
    blocks: Arc<DashMap<IpAddr, BlockEntry>>,
    clock: Arc<dyn Clock>,
}

impl IpBlocker {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            blocks: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Block `ip` for `duration` (at most `MAX_BLOCK_DURATION`), replacing any existing block
    pub fn block(
        &self,
        ip: IpAddr,
        reason: impl Into<String>,
        blocked_by: impl Into<String>,
        duration: Duration,
    ) -> BlockEntry {
        let now = self.clock.now();
        let expires_at = now
            .checked_add(duration.min(MAX_BLOCK_DURATION))
            .unwrap_or(now);
        let entry = BlockEntry {
            ip,
            reason: reason.into(),
            blocked_by: blocked_by.into(),
            blocked_at: Utc::now(),
            expires_at,
        };
        self.blocks.insert(ip, entry.clone());
        entry
    }

    /// Lift a block early; false if `ip` was not blocked
    pub fn unblock(&self, ip: IpAddr) -> bool {
        self.blocks.remove(&ip).is_some()
    }

    /// Active block for `ip`, releasing it first if it has expired
    pub fn get(&self, ip: IpAddr) -> Option<BlockEntry> {
        let now = self.clock.now();
        self.blocks.remove_if(&ip, |_, entry| now > entry.expires_at);
        self.blocks.get(&ip).map(|entry| entry.value().clone())
    }

    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.get(ip).is_some()
    }

    /// Active blocks sorted by IP; expired ones are released along the way
    pub fn entries(&self) -> Vec<BlockEntry> {
        let now = self.clock.now();
        self.blocks.retain(|_, entry| now <= entry.expires_at);
        let mut entries: Vec<BlockEntry> = self.blocks.iter().map(|e| e.value().clone()).collect();
        entries.sort_by_key(|entry| entry.ip);
        entries
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }
}

impl Default for IpBlocker {
    fn default() -> Self {
        Self::new()
    }
}
