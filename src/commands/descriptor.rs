//! Handler descriptors
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serde::Serialize;
use serenity::model::Permissions;

/// Surface a handler is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Prefixed text command or slash command
    Command,
    Button,
    SelectMenu,
    Modal,
}

/// Static description of a handler: names, access requirements and throttle
///
/// Built once when the handler is registered and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    pub id: String,
    pub aliases: Vec<String>,
    pub kind: HandlerKind,
    pub description: String,
    pub required_user_permissions: Permissions,
    pub required_bot_permissions: Permissions,
    pub owner_only: bool,
    pub cooldown_seconds: u64,
}

impl HandlerDescriptor {
    pub fn new(id: impl Into<String>, kind: HandlerKind) -> Self {
        Self {
            id: id.into(),
            aliases: Vec::new(),
            kind,
            description: String::new(),
            required_user_permissions: Permissions::empty(),
            required_bot_permissions: Permissions::empty(),
            owner_only: false,
            cooldown_seconds: 0,
        }
    }

    pub fn command(id: impl Into<String>) -> Self {
        Self::new(id, HandlerKind::Command)
    }

    pub fn button(id: impl Into<String>) -> Self {
        Self::new(id, HandlerKind::Button)
    }

    pub fn select_menu(id: impl Into<String>) -> Self {
        Self::new(id, HandlerKind::SelectMenu)
    }

    pub fn modal(id: impl Into<String>) -> Self {
        Self::new(id, HandlerKind::Modal)
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn user_permissions(mut self, permissions: Permissions) -> Self {
        self.required_user_permissions = permissions;
        self
    }

    pub fn bot_permissions(mut self, permissions: Permissions) -> Self {
        self.required_bot_permissions = permissions;
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    pub fn cooldown(mut self, seconds: u64) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    /// Primary id followed by every alias, lowercased
    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(&self.id)
            .chain(self.aliases.iter())
            .map(|name| name.to_lowercase())
    }
}
