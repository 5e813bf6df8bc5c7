//! Error taxonomy for the dispatch pipeline
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! `Denial` covers the user-visible, non-fatal stops (gate and cooldown).
//! `RegistryError` is raised while building the registry at startup and aborts boot.

use serenity::model::Permissions;
use thiserror::Error;

/// Human readable, comma separated names of a permission set
pub fn permission_list(permissions: &Permissions) -> String {
    let names = permissions.get_permission_names();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Why an invocation was stopped before its handler ran
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("handler is restricted to bot owners")]
    OwnerOnly,

    #[error("actor is missing permissions: {}", permission_list(.missing))]
    InsufficientUserPermissions { missing: Permissions },

    #[error("bot is missing permissions: {}", permission_list(.missing))]
    InsufficientBotPermissions { missing: Permissions },

    #[error("cooldown active for another {remaining_ms}ms")]
    CooldownActive { remaining_ms: u64 },
}

impl Denial {
    /// Short notice shown to the invoking user
    pub fn notice(&self) -> String {
        match self {
            Denial::OwnerOnly => "⛔ This command can only be used by the bot owners.".to_string(),
            Denial::InsufficientUserPermissions { missing } => format!(
                "⛔ You need the following permissions to do that: {}",
                permission_list(missing)
            ),
            Denial::InsufficientBotPermissions { missing } => format!(
                "⚠️ I need the following permissions to do that: {}",
                permission_list(missing)
            ),
            Denial::CooldownActive { remaining_ms } => {
                format!("⏱️ Slow down! Try again in {remaining_ms}ms.")
            }
        }
    }
}

/// Startup-time registration failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("handler name `{name}` is already registered by `{existing}`")]
    DuplicateRegistration { name: String, existing: String },

    #[error("handler id must not be empty")]
    EmptyId,
}
