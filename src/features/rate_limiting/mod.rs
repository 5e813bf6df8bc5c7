//! # Feature: Rate Limiting
//!
//! Caps request volume per source IP over a fixed window and escalates
//! repeat offenders to a timed block.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Fixed window per IP, violation escalation and the IP block table
//! - 1.0.0: Initial release with per-user sliding window rate limiting

pub mod blocker;
pub mod guard;
pub mod limiter;

pub use blocker::{BlockEntry, IpBlocker};
pub use guard::{SecurityDenial, SecurityGuard, SecurityPolicy};
pub use limiter::{RateLimitConfig, RateLimiter};
