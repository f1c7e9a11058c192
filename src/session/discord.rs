//! [`Session`] over serenity's HTTP client and cache

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::channel::{AttachmentType, Channel, ChannelType};
use serenity::model::id::{ChannelId, MessageId, UserId};
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;
use std::borrow::Cow;
use std::sync::Arc;

use super::{ChannelKind, ChannelSummary, InteractionRef, Session};

#[derive(Clone)]
pub struct SerenityHttp {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityHttp {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    pub fn from_context(ctx: &Context) -> Self {
        Self::new(ctx.http.clone(), ctx.cache.clone())
    }
}

fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::News => ChannelKind::News,
        ChannelType::NewsThread | ChannelType::PublicThread | ChannelType::PrivateThread => {
            ChannelKind::Thread
        }
        ChannelType::Voice => ChannelKind::Voice,
        ChannelType::Stage => ChannelKind::Stage,
        ChannelType::Category => ChannelKind::Category,
        ChannelType::Private => ChannelKind::Dm,
        _ => ChannelKind::Other,
    }
}

#[async_trait]
impl Session for SerenityHttp {
    async fn create_response(&self, interaction: &InteractionRef, body: &Value) -> Result<()> {
        self.http
            .create_interaction_response(interaction.id.0, &interaction.token, body)
            .await?;
        Ok(())
    }

    async fn create_followup(&self, interaction: &InteractionRef, body: &Value) -> Result<MessageId> {
        let message = self
            .http
            .create_followup_message(&interaction.token, body)
            .await?;
        Ok(message.id)
    }

    async fn original_response(&self, interaction: &InteractionRef) -> Result<MessageId> {
        let message = self
            .http
            .get_original_interaction_response(&interaction.token)
            .await?;
        Ok(message.id)
    }

    async fn edit_original_response(&self, interaction: &InteractionRef, body: &Value) -> Result<()> {
        self.http
            .edit_original_interaction_response(&interaction.token, body)
            .await?;
        Ok(())
    }

    async fn edit_followup(
        &self,
        interaction: &InteractionRef,
        message: MessageId,
        body: &Value,
    ) -> Result<()> {
        self.http
            .edit_followup_message(&interaction.token, message.0, body)
            .await?;
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, body: &Value) -> Result<MessageId> {
        let message = self.http.send_message(channel.0, body).await?;
        Ok(message.id)
    }

    async fn edit_message(&self, channel: ChannelId, message: MessageId, body: &Value) -> Result<()> {
        self.http.edit_message(channel.0, message.0, body).await?;
        Ok(())
    }

    async fn send_file(
        &self,
        channel: ChannelId,
        content: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        let attachment = AttachmentType::Bytes {
            data: Cow::Owned(data),
            filename: filename.to_string(),
        };
        channel
            .send_files(&self.http, vec![attachment], |m| m.content(content))
            .await?;
        Ok(())
    }

    async fn broadcast_typing(&self, channel: ChannelId) -> Result<()> {
        self.http.broadcast_typing(channel.0).await?;
        Ok(())
    }

    async fn channel(&self, channel: ChannelId) -> Result<ChannelSummary> {
        match self.http.get_channel(channel.0).await? {
            Channel::Guild(gc) => Ok(ChannelSummary {
                id: gc.id,
                guild_id: Some(gc.guild_id),
                name: gc.name.clone(),
                kind: channel_kind(gc.kind),
            }),
            Channel::Private(pc) => Ok(ChannelSummary {
                id: pc.id,
                guild_id: None,
                name: pc.name(),
                kind: ChannelKind::Dm,
            }),
            _ => bail!("channel {channel} has an unsupported type"),
        }
    }

    async fn permissions(&self, channel: ChannelId, user: UserId) -> Result<Permissions> {
        let guild_channel = match self.cache.guild_channel(channel) {
            Some(gc) => gc,
            None => match self.http.get_channel(channel.0).await? {
                Channel::Guild(gc) => gc,
                _ => bail!("channel {channel} is not part of a guild"),
            },
        };
        Ok(guild_channel.permissions_for_user(&self.cache, user)?)
    }

    fn current_user_id(&self) -> UserId {
        self.cache.current_user_id()
    }
}
