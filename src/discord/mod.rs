//! # Discord Integration
//!
//! Serenity glue: gateway events become `IncomingEvent`s for the dispatcher,
//! and replies flow back through channel messages or interaction responses.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod events;
pub mod replier;
pub mod slash;

pub use events::{dm_permissions, from_command, from_component, from_message, from_modal};
pub use replier::{ChannelReplier, InteractionReplier, InteractionSource};
pub use slash::{create_slash_commands, register_global_commands};
