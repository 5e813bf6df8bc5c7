//! Shared and per-invocation context for handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Split into `CommandContext` (shared services) and `InvocationContext` (one per event)
//! - 1.0.0: Initial implementation with core shared state

use serenity::model::Permissions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::descriptor::HandlerKind;
use super::registry::SharedRegistry;
use crate::features::guild_settings::GuildSettings;
use crate::features::rate_limiting::SecurityGuard;

/// Shared services available to every handler
#[derive(Clone)]
pub struct CommandContext {
    pub registry: SharedRegistry,
    pub guild_settings: GuildSettings,
    pub security: Arc<SecurityGuard>,
    pub start_time: Instant,
}

impl CommandContext {
    pub fn new(
        registry: SharedRegistry,
        guild_settings: GuildSettings,
        security: Arc<SecurityGuard>,
    ) -> Self {
        Self {
            registry,
            guild_settings,
            security,
            start_time: Instant::now(),
        }
    }
}

/// The principal that triggered an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: u64,
    pub is_bot: bool,
    /// Effective permissions in the channel the event came from
    pub permissions: Permissions,
}

impl Actor {
    pub fn user(id: u64, permissions: Permissions) -> Self {
        Self {
            id,
            is_bot: false,
            permissions,
        }
    }
}

/// Structured data attached to an interaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    None,
    /// Option values picked in a select menu
    Selected(Vec<String>),
    /// Modal input values keyed by component custom id
    Fields(HashMap<String, String>),
}

/// Where an event came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Free text message that may start with the guild prefix
    Text(String),
    /// Structured interaction; `custom_id` is the slash command name for `HandlerKind::Command`
    Interaction {
        kind: HandlerKind,
        custom_id: String,
        args: Vec<String>,
        payload: Payload,
    },
}

/// One raw incoming event as produced by the host integration
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    pub source: Source,
    pub actor: Actor,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub locale: String,
    /// The bot's own effective permissions in that channel
    pub bot_permissions: Permissions,
}

/// Ephemeral per-call record handed to `Handler::execute`
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: Uuid,
    pub handler_id: String,
    pub actor_id: u64,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub raw_args: Vec<String>,
    pub locale: String,
    pub payload: Payload,
}

impl InvocationContext {
    /// Value of a modal field, if this invocation carries one
    pub fn field(&self, custom_id: &str) -> Option<&str> {
        match &self.payload {
            Payload::Fields(fields) => fields.get(custom_id).map(String::as_str),
            _ => None,
        }
    }

    /// Remaining arguments from `index` joined with spaces
    pub fn rest_from(&self, index: usize) -> Option<String> {
        let rest = self.raw_args.get(index..)?;
        if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(args: &[&str], payload: Payload) -> InvocationContext {
        InvocationContext {
            request_id: Uuid::new_v4(),
            handler_id: "test".to_string(),
            actor_id: 1,
            guild_id: None,
            channel_id: 2,
            raw_args: args.iter().map(|a| a.to_string()).collect(),
            locale: "en-US".to_string(),
            payload,
        }
    }

    #[test]
    fn test_command_context_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<CommandContext>();
    }

    #[test]
    fn test_field_lookup() {
        let fields = HashMap::from([("topic".to_string(), "bugs".to_string())]);
        let ctx = invocation(&[], Payload::Fields(fields));
        assert_eq!(ctx.field("topic"), Some("bugs"));
        assert_eq!(ctx.field("missing"), None);
        assert_eq!(invocation(&[], Payload::None).field("topic"), None);
    }

    #[test]
    fn test_rest_from() {
        let ctx = invocation(&["1.2.3.4", "12", "spamming", "the", "api"], Payload::None);
        assert_eq!(ctx.rest_from(2).as_deref(), Some("spamming the api"));
        assert_eq!(ctx.rest_from(5), None);
        assert_eq!(ctx.rest_from(9), None);
    }
}
