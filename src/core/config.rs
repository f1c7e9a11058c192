//! Environment configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Token, prefix, log channel, permission override and pager lifetime

use anyhow::{Context as _, Result};
use serenity::model::id::{ChannelId, GuildId};
use std::time::Duration;

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_PAGER_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Settings the router consults while dispatching
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Prefix that marks a plain message as a legacy command
    pub prefix: String,
    /// Operational channel receiving panic reports and startup notices
    pub log_channel: Option<ChannelId>,
    /// ADMINISTRATOR satisfies any legacy permission gate
    pub admin_override: bool,
    pub pager_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            log_channel: None,
            admin_override: true,
            pager_timeout: DEFAULT_PAGER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Publish commands to this guild only (instant updates during development)
    pub guild_id: Option<GuildId>,
    pub log_level: String,
    pub router: RouterConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let discord_token = get("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        let guild_id = get("DISCORD_GUILD_ID")
            .map(|raw| raw.parse::<u64>().context("DISCORD_GUILD_ID must be a numeric id"))
            .transpose()?
            .map(GuildId);

        let log_channel = get("LOG_CHANNEL_ID")
            .map(|raw| raw.parse::<u64>().context("LOG_CHANNEL_ID must be a numeric id"))
            .transpose()?
            .map(ChannelId);

        let admin_override = match get("ADMIN_OVERRIDE") {
            Some(raw) => parse_bool(&raw).context("ADMIN_OVERRIDE must be true or false")?,
            None => true,
        };

        let pager_timeout = get("PAGER_TIMEOUT_SECS")
            .map(|raw| raw.parse::<u64>().context("PAGER_TIMEOUT_SECS must be a number of seconds"))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PAGER_TIMEOUT);

        Ok(Self {
            discord_token,
            guild_id,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            router: RouterConfig {
                prefix: get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
                log_channel,
                admin_override,
                pager_timeout,
            },
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.guild_id, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.router.prefix, "!");
        assert!(config.router.admin_override);
        assert_eq!(config.router.pager_timeout, DEFAULT_PAGER_TIMEOUT);
    }

    #[test]
    fn test_missing_token_is_error() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_GUILD_ID", "42"),
            ("LOG_CHANNEL_ID", "7"),
            ("COMMAND_PREFIX", "?"),
            ("ADMIN_OVERRIDE", "off"),
            ("PAGER_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(config.guild_id, Some(GuildId(42)));
        assert_eq!(config.router.log_channel, Some(ChannelId(7)));
        assert_eq!(config.router.prefix, "?");
        assert!(!config.router.admin_override);
        assert_eq!(config.router.pager_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("LOG_CHANNEL_ID", "general")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("ADMIN_OVERRIDE", "maybe")]).is_err());
    }
}
