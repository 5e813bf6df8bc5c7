//! # Feature: Guild Settings
//!
//! Per-guild command prefix, seeded from an optional YAML file and
//! changeable at runtime through the `prefix` command.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub const MAX_PREFIX_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixError {
    #[error("prefix must not be empty")]
    Empty,
    #[error("prefix must not contain whitespace")]
    Whitespace,
    #[error("prefix must be at most {} characters", MAX_PREFIX_LEN)]
    TooLong,
}

/// Check that a prefix is usable
pub fn validate_prefix(prefix: &str) -> Result<(), PrefixError> {
    if prefix.is_empty() {
        return Err(PrefixError::Empty);
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(PrefixError::Whitespace);
    }
    if prefix.chars().count() > MAX_PREFIX_LEN {
        return Err(PrefixError::TooLong);
    }
    Ok(())
}

/// On-disk seed format
///
/// ```yaml
/// guilds:
///   123456789012345678:
///     prefix: "n!"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GuildSettingsFile {
    #[serde(default)]
    pub guilds: HashMap<u64, GuildEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuildEntry {
    pub prefix: String,
}

impl GuildSettingsFile {
    /// Load and validate a settings file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let file: GuildSettingsFile = serde_yaml::from_str(contents)?;
        for (guild_id, entry) in &file.guilds {
            validate_prefix(&entry.prefix)
                .map_err(|e| anyhow!("Invalid prefix for guild {guild_id}: {e}"))?;
        }
        Ok(file)
    }
}

/// Prefix lookup shared by the dispatcher and handlers
#[derive(Clone)]
pub struct GuildSettings {
    prefixes: Arc<DashMap<u64, String>>,
    default_prefix: String,
}

impl GuildSettings {
    pub fn new(default_prefix: impl Into<String>) -> Self {
        Self {
            prefixes: Arc::new(DashMap::new()),
            default_prefix: default_prefix.into(),
        }
    }

    /// Apply a seed file, returning how many guilds it configured
    pub fn apply(&self, file: GuildSettingsFile) -> usize {
        let count = file.guilds.len();
        for (guild_id, entry) in file.guilds {
            self.prefixes.insert(guild_id, entry.prefix);
        }
        info!("Loaded prefix overrides for {count} guilds");
        count
    }

    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    /// Prefix for a guild; DMs and unconfigured guilds use the default
    pub fn prefix(&self, guild_id: Option<u64>) -> String {
        guild_id
            .and_then(|id| self.prefixes.get(&id).map(|p| p.value().clone()))
            .unwrap_or_else(|| self.default_prefix.clone())
    }

    pub fn set_prefix(&self, guild_id: u64, prefix: &str) -> Result<(), PrefixError> {
        validate_prefix(prefix)?;
        if prefix == self.default_prefix {
            self.prefixes.remove(&guild_id);
        } else {
            self.prefixes.insert(guild_id, prefix.to_string());
        }
        Ok(())
    }

    pub fn reset_prefix(&self, guild_id: u64) {
        self.prefixes.remove(&guild_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix_for_dm_and_unknown_guild() {
        let settings = GuildSettings::new("!");
        assert_eq!(settings.prefix(None), "!");
        assert_eq!(settings.prefix(Some(1)), "!");
    }

    #[test]
    fn test_set_and_reset_prefix() {
        let settings = GuildSettings::new("!");
        settings.set_prefix(1, "n!").unwrap();
        assert_eq!(settings.prefix(Some(1)), "n!");
        assert_eq!(settings.prefix(Some(2)), "!");

        settings.reset_prefix(1);
        assert_eq!(settings.prefix(Some(1)), "!");
    }

    #[test]
    fn test_invalid_prefixes_rejected() {
        let settings = GuildSettings::new("!");
        assert_eq!(settings.set_prefix(1, ""), Err(PrefixError::Empty));
        assert_eq!(settings.set_prefix(1, "a b"), Err(PrefixError::Whitespace));
        assert_eq!(settings.set_prefix(1, "toolong"), Err(PrefixError::TooLong));
        assert_eq!(settings.prefix(Some(1)), "!");
    }

    #[test]
    fn test_parse_seed_file() {
        let yaml = "guilds:\n  42:\n    prefix: \"n!\"\n  7:\n    prefix: \"?\"\n";
        let file = GuildSettingsFile::parse(yaml).unwrap();

        let settings = GuildSettings::new("!");
        assert_eq!(settings.apply(file), 2);
        assert_eq!(settings.prefix(Some(42)), "n!");
        assert_eq!(settings.prefix(Some(7)), "?");
    }

    #[test]
    fn test_parse_rejects_invalid_prefix() {
        let yaml = "guilds:\n  42:\n    prefix: \"far too long\"\n";
        assert!(GuildSettingsFile::parse(yaml).is_err());
    }

    #[test]
    fn test_parse_empty_file() {
        let file = GuildSettingsFile::parse("guilds: {}\n").unwrap();
        assert!(file.guilds.is_empty());
    }
}
