//! # Session
//!
//! The transport seam between the router and the platform. Every REST call the
//! router makes goes through [`Session`]; production uses [`SerenityHttp`].
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: File uploads for the operational log channel
//! - 1.0.0: Interaction callbacks, followups, message send/edit, permissions

pub mod discord;

#[cfg(test)]
pub(crate) mod recording;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use serenity::model::id::{ChannelId, GuildId, InteractionId, MessageId, UserId};
use serenity::model::permissions::Permissions;

pub use discord::SerenityHttp;

/// What is needed to answer an interaction after the fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRef {
    pub id: InteractionId,
    pub token: String,
}

/// A sent message, addressed the way it can be edited later
///
/// Interaction messages are edited through the interaction webhook so that
/// ephemeral messages stay reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRef {
    Original {
        interaction: InteractionRef,
        message: MessageId,
    },
    Followup {
        interaction: InteractionRef,
        message: MessageId,
    },
    Channel {
        channel: ChannelId,
        message: MessageId,
    },
}

impl MessageRef {
    pub fn id(&self) -> MessageId {
        match self {
            MessageRef::Original { message, .. }
            | MessageRef::Followup { message, .. }
            | MessageRef::Channel { message, .. } => *message,
        }
    }

    pub async fn edit(&self, session: &dyn Session, body: &Value) -> Result<()> {
        match self {
            MessageRef::Original { interaction, .. } => {
                session.edit_original_response(interaction, body).await
            }
            MessageRef::Followup {
                interaction,
                message,
            } => session.edit_followup(interaction, *message, body).await,
            MessageRef::Channel { channel, message } => {
                session.edit_message(*channel, *message, body).await
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    News,
    Thread,
    Voice,
    Stage,
    Category,
    Dm,
    Other,
}

impl ChannelKind {
    /// Channels that hold a regular message history
    pub fn is_text(self) -> bool {
        matches!(self, ChannelKind::Text | ChannelKind::News | ChannelKind::Thread)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub name: String,
    pub kind: ChannelKind,
}

/// REST surface the router needs from the platform
///
/// Bodies are JSON payloads in the platform's documented shapes, built by
/// [`crate::core::reply`].
#[async_trait]
pub trait Session: Send + Sync {
    /// Initial interaction callback (message, defer, update, autocomplete, modal)
    async fn create_response(&self, interaction: &InteractionRef, body: &Value) -> Result<()>;

    async fn create_followup(&self, interaction: &InteractionRef, body: &Value) -> Result<MessageId>;

    /// Id of the message created by the initial callback
    async fn original_response(&self, interaction: &InteractionRef) -> Result<MessageId>;

    async fn edit_original_response(&self, interaction: &InteractionRef, body: &Value) -> Result<()>;

    async fn edit_followup(
        &self,
        interaction: &InteractionRef,
        message: MessageId,
        body: &Value,
    ) -> Result<()>;

    async fn send_message(&self, channel: ChannelId, body: &Value) -> Result<MessageId>;

    async fn edit_message(&self, channel: ChannelId, message: MessageId, body: &Value) -> Result<()>;

    async fn send_file(
        &self,
        channel: ChannelId,
        content: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<()>;

    async fn broadcast_typing(&self, channel: ChannelId) -> Result<()>;

    async fn channel(&self, channel: ChannelId) -> Result<ChannelSummary>;

    /// Effective permissions of `user` in `channel`, overwrites applied
    async fn permissions(&self, channel: ChannelId, user: UserId) -> Result<Permissions>;

    fn current_user_id(&self) -> UserId;
}
