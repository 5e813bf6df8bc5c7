//! Translation from serenity gateway events into `IncomingEvent`

use log::debug;
use serde_json::Value;
use serenity::model::application::component::{ActionRowComponent, ComponentType};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::channel::Message;
use serenity::model::guild::Member;
use serenity::model::id::{GuildId, UserId};
use serenity::model::user::User;
use serenity::model::Permissions;
use serenity::prelude::Context;
use std::collections::HashMap;

use crate::commands::{Actor, HandlerKind, IncomingEvent, Payload, Source};

const DEFAULT_LOCALE: &str = "en-US";

/// What both sides can do in a direct message channel
pub fn dm_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL
        | Permissions::SEND_MESSAGES
        | Permissions::EMBED_LINKS
        | Permissions::ATTACH_FILES
        | Permissions::READ_MESSAGE_HISTORY
        | Permissions::ADD_REACTIONS
}

/// Build an event from a text message, resolving channel permissions from the cache
pub fn from_message(ctx: &Context, msg: &Message) -> IncomingEvent {
    let (user_permissions, bot_permissions) = match msg.guild_id {
        None => (dm_permissions(), dm_permissions()),
        Some(_) => match ctx.cache.guild_channel(msg.channel_id) {
            Some(channel) => {
                let resolve = |user_id: UserId| {
                    channel
                        .permissions_for_user(&ctx.cache, user_id)
                        .unwrap_or_else(|e| {
                            debug!("Could not resolve permissions for {user_id}: {e}");
                            Permissions::empty()
                        })
                };
                (resolve(msg.author.id), resolve(ctx.cache.current_user_id()))
            }
            None => {
                debug!("Channel {} not cached; assuming no permissions", msg.channel_id);
                (Permissions::empty(), Permissions::empty())
            }
        },
    };

    IncomingEvent {
        source: Source::Text(msg.content.clone()),
        actor: Actor {
            id: msg.author.id.0,
            is_bot: msg.author.bot,
            permissions: user_permissions,
        },
        guild_id: msg.guild_id.map(|g| g.0),
        channel_id: msg.channel_id.0,
        locale: DEFAULT_LOCALE.to_string(),
        bot_permissions,
    }
}

pub fn from_command(command: &ApplicationCommandInteraction) -> IncomingEvent {
    let args = option_arguments(command.data.options.iter().filter_map(|o| o.value.as_ref()));

    IncomingEvent {
        source: Source::Interaction {
            kind: HandlerKind::Command,
            custom_id: command.data.name.clone(),
            args,
            payload: Payload::None,
        },
        actor: interaction_actor(&command.user, command.member.as_ref(), command.guild_id),
        guild_id: command.guild_id.map(|g| g.0),
        channel_id: command.channel_id.0,
        locale: command.locale.clone(),
        bot_permissions: app_permissions(command.app_permissions, command.guild_id),
    }
}

pub fn from_component(component: &MessageComponentInteraction) -> IncomingEvent {
    let (kind, payload) = match component.data.component_type {
        ComponentType::Button => (HandlerKind::Button, Payload::None),
        _ => (
            HandlerKind::SelectMenu,
            Payload::Selected(component.data.values.clone()),
        ),
    };

    IncomingEvent {
        source: Source::Interaction {
            kind,
            custom_id: component.data.custom_id.clone(),
            args: Vec::new(),
            payload,
        },
        actor: interaction_actor(&component.user, component.member.as_ref(), component.guild_id),
        guild_id: component.guild_id.map(|g| g.0),
        channel_id: component.channel_id.0,
        locale: component.locale.clone(),
        bot_permissions: app_permissions(component.app_permissions, component.guild_id),
    }
}

pub fn from_modal(modal: &ModalSubmitInteraction) -> IncomingEvent {
    let fields: HashMap<String, String> = modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            ActionRowComponent::InputText(input) => {
                Some((input.custom_id.clone(), input.value.clone()))
            }
            _ => None,
        })
        .collect();

    IncomingEvent {
        source: Source::Interaction {
            kind: HandlerKind::Modal,
            custom_id: modal.data.custom_id.clone(),
            args: Vec::new(),
            payload: Payload::Fields(fields),
        },
        actor: interaction_actor(&modal.user, modal.member.as_ref(), modal.guild_id),
        guild_id: modal.guild_id.map(|g| g.0),
        channel_id: modal.channel_id.0,
        locale: modal.locale.clone(),
        bot_permissions: app_permissions(modal.app_permissions, modal.guild_id),
    }
}

fn interaction_actor(user: &User, member: Option<&Member>, guild_id: Option<GuildId>) -> Actor {
    // Discord resolves member permissions for the interaction channel
    let permissions = match guild_id {
        None => dm_permissions(),
        Some(_) => member
            .and_then(|m| m.permissions)
            .unwrap_or_else(Permissions::empty),
    };
    Actor {
        id: user.id.0,
        is_bot: user.bot,
        permissions,
    }
}

fn app_permissions(resolved: Option<Permissions>, guild_id: Option<GuildId>) -> Permissions {
    match (resolved, guild_id) {
        (Some(permissions), _) => permissions,
        (None, None) => dm_permissions(),
        (None, Some(_)) => Permissions::empty(),
    }
}

/// Flatten slash command option values into positional arguments
///
/// String options are split on whitespace so a single free-form option
/// behaves like the tail of a text command.
pub fn option_arguments<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<String> {
    let mut args = Vec::new();
    for value in values {
        match value {
            Value::String(s) => args.extend(s.split_whitespace().map(str::to_string)),
            Value::Null => {}
            other => args.push(other.to_string()),
        }
    }
    args
}
