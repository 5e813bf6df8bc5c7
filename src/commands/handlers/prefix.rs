//! Per-guild prefix management
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::Permissions;
use std::sync::Arc;

use crate::commands::context::{CommandContext, InvocationContext};
use crate::commands::descriptor::HandlerDescriptor;
use crate::commands::handler::Handler;
use crate::core::{Replier, Reply};

/// Handler for `prefix [new|reset]`
pub struct PrefixHandler;

#[async_trait]
impl Handler for PrefixHandler {
    fn describe(&self) -> HandlerDescriptor {
        HandlerDescriptor::command("prefix")
            .description("Show or change this server's command prefix")
            .user_permissions(Permissions::MANAGE_GUILD)
            .bot_permissions(Permissions::SEND_MESSAGES)
            .cooldown(10)
    }

    async fn execute(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &InvocationContext,
        replier: &dyn Replier,
    ) -> Result<()> {
        // Prefixes only exist per guild
        let Some(guild_id) = invocation.guild_id else {
            return Ok(());
        };

        let settings = &ctx.guild_settings;
        let reply = match invocation.raw_args.first().map(String::as_str) {
            None => Reply::public(format!(
                "Current prefix: `{}`",
                settings.prefix(Some(guild_id))
            )),
            Some("reset") => {
                settings.reset_prefix(guild_id);
                info!("Prefix reset for guild {guild_id} by {}", invocation.actor_id);
                Reply::public(format!(
                    "✅ Prefix reset to `{}`",
                    settings.default_prefix()
                ))
            }
            Some(new_prefix) => match settings.set_prefix(guild_id, new_prefix) {
                Ok(()) => {
                    info!(
                        "Prefix for guild {guild_id} set to {new_prefix:?} by {}",
                        invocation.actor_id
                    );
                    Reply::public(format!("✅ Prefix set to `{new_prefix}`"))
                }
                Err(e) => Reply::ephemeral(format!("❌ Invalid prefix: {e}")),
            },
        };

        replier.send(reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handlers::test_support::{context_with, invocation, RecordingReplier};

    fn in_guild(args: &[&str]) -> InvocationContext {
        let mut invocation = invocation("prefix", args);
        invocation.guild_id = Some(10);
        invocation
    }

    #[test]
    fn test_descriptor_requires_manage_guild() {
        let descriptor = PrefixHandler.describe();
        assert_eq!(descriptor.required_user_permissions, Permissions::MANAGE_GUILD);
        assert_eq!(descriptor.required_bot_permissions, Permissions::SEND_MESSAGES);
        assert_eq!(descriptor.cooldown_seconds, 10);
    }

    #[tokio::test]
    async fn test_show_set_and_reset() {
        let ctx = context_with(vec![]);
        let replier = RecordingReplier::default();

        PrefixHandler.execute(ctx.clone(), &in_guild(&[]), &replier).await.unwrap();
        PrefixHandler.execute(ctx.clone(), &in_guild(&["?"]), &replier).await.unwrap();
        assert_eq!(ctx.guild_settings.prefix(Some(10)), "?");
        PrefixHandler.execute(ctx.clone(), &in_guild(&["reset"]), &replier).await.unwrap();
        assert_eq!(ctx.guild_settings.prefix(Some(10)), "!");

        let contents: Vec<String> = replier.sent().into_iter().map(|r| r.content).collect();
        assert_eq!(
            contents,
            vec![
                "Current prefix: `!`".to_string(),
                "✅ Prefix set to `?`".to_string(),
                "✅ Prefix reset to `!`".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_prefix_rejected() {
        let ctx = context_with(vec![]);
        let replier = RecordingReplier::default();

        PrefixHandler
            .execute(ctx.clone(), &in_guild(&["toolong"]), &replier)
            .await
            .unwrap();

        let sent = replier.sent();
        assert!(sent[0].ephemeral);
        assert!(sent[0].content.starts_with("❌ Invalid prefix"));
        assert_eq!(ctx.guild_settings.prefix(Some(10)), "!");
    }

    #[tokio::test]
    async fn test_direct_message_is_silent() {
        let ctx = context_with(vec![]);
        let replier = RecordingReplier::default();

        PrefixHandler
            .execute(ctx, &invocation("prefix", &["?"]), &replier)
            .await
            .unwrap();

        assert!(replier.sent().is_empty());
    }
}
