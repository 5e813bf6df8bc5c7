//! # Feature: Permission Gate
//!
//! Decides whether an actor may run a handler: owner restriction, then the
//! actor's permissions, then the bot's own permissions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod gate;

pub use gate::PermissionGate;
