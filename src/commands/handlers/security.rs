//! Owner commands for the HTTP IP block table
//!
//! Handles: blockip, unblockip, blocklist
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use super::utility::format_uptime;
use crate::commands::context::{CommandContext, InvocationContext};
use crate::commands::descriptor::HandlerDescriptor;
use crate::commands::handler::Handler;
use crate::core::response::chunk_lines;
use crate::core::{Replier, Reply, MESSAGE_LIMIT};
use crate::features::rate_limiting::blocker::MAX_BLOCK_DURATION;

const DEFAULT_REASON: &str = "Blocked by owner";

const MAX_BLOCK_HOURS: u64 = MAX_BLOCK_DURATION.as_secs() / 3600;

/// Handler for `blockip <ip> [hours] [reason...]`
pub struct BlockIpHandler;

#[async_trait]
impl Handler for BlockIpHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::command("blockip")
            .description("Block an IP from the HTTP API")
            .owner_only()
    }

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        let Some(ip) = parse_ip(invocation.raw_args.first()) else {
            return replier
                .send(Reply::ephemeral("Usage: `blockip <ip> [hours] [reason]`"))
                .await;
        };

        // The hours argument is optional; anything non-numeric starts the reason
        let (duration, reason_start) = match invocation.raw_args.get(1).map(|h| h.parse::<u64>()) {
            Some(Ok(0)) => {
                return replier
                    .send(Reply::ephemeral("❌ Hours must be greater than zero"))
                    .await;
            }
            Some(Ok(hours)) if hours > MAX_BLOCK_HOURS => {
                return replier
                    .send(Reply::ephemeral(format!(
                        "❌ Hours too large, the maximum is {MAX_BLOCK_HOURS}"
                    )))
                    .await;
            }
            Some(Ok(hours)) => (Duration::from_secs(hours * 3600), 2),
            _ => (ctx.security.policy().block_duration, 1),
        };
        let reason = invocation
            .rest_from(reason_start)
            .unwrap_or_else(|| DEFAULT_REASON.to_string());

        let entry = ctx.security.blocker().block(
            ip,
            reason,
            invocation.actor_id.to_string(),
            duration,
        );
        warn!(
            "IP {ip} blocked by {} for {}s: {}",
            entry.blocked_by,
            duration.as_secs(),
            entry.reason
        );

        replier
            .send(Reply::public(format!(
                "🚫 Blocked `{ip}` for {} ({})",
                format_uptime(duration),
                entry.reason
            )))
            .await
    }
}

/// Handler for `unblockip <ip>`
pub struct UnblockIpHandler;

#[async_trait]
impl Handler for UnblockIpHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::command("unblockip")
            .description("Lift a block on an IP")
            .owner_only()
    }

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        let Some(ip) = parse_ip(invocation.raw_args.first()) else {
            return replier
                .send(Reply::ephemeral("Usage: `unblockip <ip>`"))
                .await;
        };

        let reply = if ctx.security.blocker().unblock(ip) {
            info!("IP {ip} unblocked by {}", invocation.actor_id);
            Reply::public(format!("✅ Unblocked `{ip}`"))
        } else {
            Reply::ephemeral(format!("`{ip}` is not blocked"))
        };
        replier.send(reply).await
    }
}

/// Handler for `blocklist`
pub struct BlockListHandler;

#[async_trait]
impl Handler for BlockListHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::command("blocklist")
            .aliases(["blocks"])
            .description("List currently blocked IPs")
            .owner_only()
    }

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        _invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        let blocker = ctx.security.blocker();
        let entries = blocker.entries();
        if entries.is_empty() {
            return replier.send(Reply::ephemeral("No IPs are blocked")).await;
        }

        let now = blocker.now();
        let mut text = format!("**Blocked IPs ({}):**\n", entries.len());
        for entry in &entries {
            text.push_str(&format!(
                "`{}` - {} (by {}, {} left)\n",
                entry.ip,
                entry.reason,
                entry.blocked_by,
                format_uptime(entry.remaining(now))
            ));
        }

        for chunk in chunk_lines(&text, MESSAGE_LIMIT) {
            replier.send(Reply::ephemeral(chunk)).await?;
        }
        Ok(())
    }
}

fn parse_ip(raw: Option<&String>) -> Option<IpAddr> {
    raw?.parse().ok()
}
