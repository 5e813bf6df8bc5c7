//! # Feature: Cooldowns
//!
//! Per-handler, per-actor minimum interval between allowed invocations.
//! Best-effort and in-memory only; a restart clears every cooldown.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod tracker;

pub use tracker::{CooldownStatus, CooldownTracker};
