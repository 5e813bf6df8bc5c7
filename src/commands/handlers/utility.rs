//! Utility handlers
//!
//! Handles: ping, help, uptime, and the help refresh button
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Help is generated from the registry and carries refresh/feedback buttons

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use crate::commands::context::{CommandContext, InvocationContext};
use crate::commands::descriptor::{HandlerDescriptor, HandlerKind};
use crate::commands::handler::Handler;
use crate::core::response::chunk_lines;
use crate::core::{Replier, Reply, MESSAGE_LIMIT};

pub const HELP_REFRESH_ID: &str = "help_refresh";
pub const FEEDBACK_OPEN_ID: &str = "feedback_open";

/// Handler for `ping`
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::command("ping")
            .aliases(["latency"])
            .description("Check that the bot is responsive")
    }

    async fn execute(
        &self,
        _ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        replier.send(Reply::public("🏓 Pong!")).await?;
        info!("Ping command completed for user {}", invocation.actor_id);
        Ok(())
    }
}

/// Handler for `help`
pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::command("help")
            .aliases(["h", "commands"])
            .description("List the available commands")
    }

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        send_help(&ctx, invocation, replier).await
    }
}

/// Button under the help message that re-renders it
pub struct HelpRefreshHandler;

#[async_trait]
impl Handler for HelpRefreshHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::button(HELP_REFRESH_ID)
            .description("Show the command list again")
            .cooldown(5)
    }

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        send_help(&ctx, invocation, replier).await
    }
}

/// Handler for `uptime`
pub struct UptimeHandler;

#[async_trait]
impl Handler for UptimeHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::command("uptime").description("Show how long the bot has been running")
    }

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        _invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        let uptime = format_uptime(ctx.start_time.elapsed());
        replier.send(Reply::public(format!("⏱️ Uptime: {uptime}"))).await
    }
}

async fn send_help(
    ctx: &CommandContext,
    invocation: &InvocationContext,
    replier: &dyn Replier,
) -> Result<()> {
    let prefix = ctx.guild_settings.prefix(invocation.guild_id);
    let text = render_help(ctx, &prefix);
    let chunks = chunk_lines(&text, MESSAGE_LIMIT);
    let last = chunks.len().saturating_sub(1);

    for (index, chunk) in chunks.into_iter().enumerate() {
        let mut reply = Reply::public(chunk);
        if index == last {
            reply = reply
                .with_button(HELP_REFRESH_ID, "🔄 Refresh")
                .with_button(FEEDBACK_OPEN_ID, "💬 Send Feedback");
        }
        replier.send(reply).await?;
    }
    Ok(())
}

/// Command listing for the current prefix; owner-only commands are marked
pub fn render_help(ctx: &CommandContext, prefix: &str) -> String {
    let descriptors = ctx
        .registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .descriptors();

    let mut text = String::from("**Available Commands:**\n");
    for descriptor in descriptors.iter().filter(|d| d.kind == HandlerKind::Command) {
        text.push_str(&format!("`{prefix}{}`", descriptor.id));
        if !descriptor.aliases.is_empty() {
            text.push_str(&format!(" ({})", descriptor.aliases.join(", ")));
        }
        if !descriptor.description.is_empty() {
            text.push_str(&format!(" - {}", descriptor.description));
        }
        if descriptor.owner_only {
            text.push_str(" 🔒");
        }
        text.push('\n');
    }
    text.trim_end().to_string()
}

pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {seconds}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
