// Core layer - shared types, configuration and errors
pub mod core;

// Features layer - permissions, cooldowns, guild settings, rate limiting
pub mod features;

// Application layer
pub mod commands;

// Boundaries - Discord gateway and HTTP API
pub mod discord;
pub mod web;

pub use core::Config;

pub use commands::{build_registry, Dispatcher, Handler, HandlerDescriptor, Outcome};

pub use features::{
    // Cooldowns
    CooldownTracker,
    // Guild settings
    GuildSettings,
    // Permissions
    PermissionGate,
    // Rate limiting
    RateLimiter, SecurityGuard,
};
