//! Decoded option values of a chat-input invocation
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Typed getters replacing per-handler option lookups

use serde_json::Value;
use serenity::model::application::command::CommandOptionType;
use serenity::model::id::{AttachmentId, ChannelId, RoleId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(UserId),
    Channel(ChannelId),
    Role(RoleId),
    Mentionable(u64),
    Attachment(AttachmentId),
}

impl OptionValue {
    /// Decode a raw option value according to its declared type
    ///
    /// Snowflakes arrive as strings.
    pub fn decode(kind: CommandOptionType, value: &Value) -> Option<Self> {
        let snowflake = || value.as_str().and_then(|s| s.parse::<u64>().ok());
        let decoded = match kind {
            CommandOptionType::String => OptionValue::String(value.as_str()?.to_string()),
            CommandOptionType::Integer => OptionValue::Integer(value.as_i64()?),
            CommandOptionType::Number => OptionValue::Number(value.as_f64()?),
            CommandOptionType::Boolean => OptionValue::Boolean(value.as_bool()?),
            CommandOptionType::User => OptionValue::User(UserId(snowflake()?)),
            CommandOptionType::Channel => OptionValue::Channel(ChannelId(snowflake()?)),
            CommandOptionType::Role => OptionValue::Role(RoleId(snowflake()?)),
            CommandOptionType::Mentionable => OptionValue::Mentionable(snowflake()?),
            CommandOptionType::Attachment => OptionValue::Attachment(AttachmentId(snowflake()?)),
            _ => return None,
        };
        Some(decoded)
    }
}

/// Options of the resolved leaf, in the order they were sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    values: Vec<(String, OptionValue)>,
    focused: Option<String>,
    target: Option<u64>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.push((name.into(), value));
    }

    pub fn with(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn set_focused(&mut self, name: impl Into<String>) {
        self.focused = Some(name.into());
    }

    pub fn set_target(&mut self, target: u64) {
        self.target = Some(target);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<UserId> {
        match self.get(name)? {
            OptionValue::User(id) => Some(*id),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<ChannelId> {
        match self.get(name)? {
            OptionValue::Channel(id) => Some(*id),
            _ => None,
        }
    }

    pub fn role(&self, name: &str) -> Option<RoleId> {
        match self.get(name)? {
            OptionValue::Role(id) => Some(*id),
            _ => None,
        }
    }

    /// Option being typed into, for autocomplete
    pub fn focused(&self) -> Option<(&str, Option<&OptionValue>)> {
        let name = self.focused.as_deref()?;
        Some((name, self.get(name)))
    }

    /// Target user or message of a context-menu command
    pub fn target(&self) -> Option<u64> {
        self.target
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
