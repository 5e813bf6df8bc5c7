//! Handler trait
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: One trait for commands, buttons, menus and modals; handlers describe themselves
//! - 1.0.0: Initial implementation for slash command handling

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::context::{CommandContext, InvocationContext};
use super::descriptor::HandlerDescriptor;
use crate::core::Replier;

/// A unit of behaviour bound to a command name or interaction custom id
///
/// The dispatcher only calls `execute` after the permission gate and cooldown
/// have passed. Business-rule short-circuits (e.g. "not in a guild") are early
/// `Ok(())` returns; anything returned as `Err` is reported to the user as a
/// generic failure and logged.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl Handler for PingHandler {
///     fn describe(&self) -> HandlerDescriptor {
///         HandlerDescriptor::command("ping").aliases(["latency"])
///     }
///
///     async fn execute(
///         &self,
///         _ctx: Arc<CommandContext>,
///         _invocation: &InvocationContext,
///         replier: &dyn Replier,
///     ) -> Result<()> {
///         replier.send(Reply::public("Pong!")).await
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    /// Names, kind and access requirements; read once at registration
    fn describe(&self) -> HandlerDescriptor;

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // The registry stores handlers as trait objects
    fn _assert_object_safe(_: &dyn Handler) {}
}
