//! Environment-driven configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::net::SocketAddr;

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 10;
pub const DEFAULT_COOLDOWN_SWEEP_SECS: u64 = 300;

/// Which owner invocations skip the cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerCooldownBypass {
    /// Owners are throttled like everyone else
    Never,
    /// Owners skip cooldowns on owner-only handlers
    #[default]
    OwnerOnlyHandlers,
    /// Owners skip every cooldown
    Always,
}

impl std::str::FromStr for OwnerCooldownBypass {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "never" | "none" | "false" => Ok(Self::Never),
            "owner_only" => Ok(Self::OwnerOnlyHandlers),
            "always" | "all" | "true" => Ok(Self::Always),
            other => Err(anyhow!(
                "expected one of never, owner_only, always; got `{other}`"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub default_prefix: String,
    pub owner_ids: HashSet<u64>,
    pub owner_cooldown_bypass: OwnerCooldownBypass,
    pub log_level: String,
    pub http_bind_addr: SocketAddr,
    pub trust_proxy: bool,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max_requests: u32,
    pub guild_settings_path: Option<String>,
    pub cooldown_sweep_secs: u64,
}

impl Config {
    /// Read configuration from process environment variables
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        let default_prefix = lookup("BOT_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if default_prefix.is_empty() || default_prefix.chars().any(char::is_whitespace) {
            return Err(anyhow!("BOT_PREFIX must be non-empty and contain no whitespace"));
        }

        let owner_ids = match lookup("OWNER_IDS") {
            Some(raw) => parse_owner_ids(&raw)?,
            None => HashSet::new(),
        };

        let http_bind_addr = lookup("HTTP_BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("HTTP_BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        Ok(Self {
            discord_token,
            default_prefix,
            owner_ids,
            owner_cooldown_bypass: match lookup("OWNER_COOLDOWN_BYPASS") {
                Some(raw) => raw.parse().context("invalid OWNER_COOLDOWN_BYPASS")?,
                None => OwnerCooldownBypass::default(),
            },
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            http_bind_addr,
            trust_proxy: parse_flag(&lookup, "TRUST_PROXY", false)?,
            rate_limit_window_ms: parse_number(
                &lookup,
                "RATE_LIMIT_WINDOW_MS",
                DEFAULT_RATE_LIMIT_WINDOW_MS,
            )?,
            rate_limit_max_requests: parse_number(
                &lookup,
                "RATE_LIMIT_MAX_REQUESTS",
                DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            )?,
            guild_settings_path: lookup("GUILD_SETTINGS_PATH").filter(|p| !p.trim().is_empty()),
            cooldown_sweep_secs: parse_number(
                &lookup,
                "COOLDOWN_SWEEP_SECS",
                DEFAULT_COOLDOWN_SWEEP_SECS,
            )?,
        })
    }
}

/// Parse a comma separated list of Discord user ids
pub fn parse_owner_ids(raw: &str) -> Result<HashSet<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>()
                .with_context(|| format!("invalid owner id in OWNER_IDS: {id}"))
        })
        .collect()
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow!("{key} must be a boolean, got `{other}`")),
        },
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a number, got `{raw}`")),
    }
}
