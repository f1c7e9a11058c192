//! In-memory [`Session`] that records every call, for tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use serenity::model::id::{ChannelId, InteractionId, MessageId, UserId};
use serenity::model::permissions::Permissions;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use super::{ChannelSummary, InteractionRef, Session};

pub(crate) const BOT_ID: UserId = UserId(900);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Response { interaction: InteractionId, body: Value },
    Followup { interaction: InteractionId, body: Value },
    OriginalResponse { interaction: InteractionId },
    EditOriginal { interaction: InteractionId, body: Value },
    EditFollowup { message: MessageId, body: Value },
    Send { channel: ChannelId, body: Value },
    Edit { channel: ChannelId, message: MessageId, body: Value },
    File { channel: ChannelId, content: String, filename: String, data: Vec<u8> },
    Typing { channel: ChannelId },
}

pub(crate) struct RecordingSession {
    calls: Mutex<Vec<Call>>,
    next_message: AtomicU64,
    channels: Mutex<HashMap<ChannelId, ChannelSummary>>,
    permissions: Mutex<HashMap<(ChannelId, UserId), Permissions>>,
    fail_permissions: AtomicBool,
    fail_sends: AtomicBool,
    panic_responses: AtomicBool,
}

impl RecordingSession {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_message: AtomicU64::new(5000),
            channels: Mutex::new(HashMap::new()),
            permissions: Mutex::new(HashMap::new()),
            fail_permissions: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            panic_responses: AtomicBool::new(false),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn add_channel(&self, summary: ChannelSummary) {
        self.channels.lock().unwrap().insert(summary.id, summary);
    }

    pub(crate) fn grant(&self, channel: ChannelId, user: UserId, permissions: Permissions) {
        self.permissions
            .lock()
            .unwrap()
            .insert((channel, user), permissions);
    }

    pub(crate) fn fail_permissions(&self) {
        self.fail_permissions.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Make every interaction callback panic inside the session
    pub(crate) fn panic_on_responses(&self) {
        self.panic_responses.store(true, Ordering::SeqCst);
    }

    /// Id the next created message will get
    pub(crate) fn peek_message_id(&self) -> MessageId {
        MessageId(self.next_message.load(Ordering::SeqCst))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn new_message(&self) -> MessageId {
        MessageId(self.next_message.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl Session for RecordingSession {
    async fn create_response(&self, interaction: &InteractionRef, body: &Value) -> Result<()> {
        if self.panic_responses.load(Ordering::SeqCst) {
            panic!("interaction callback for {} blew up", interaction.id);
        }
        self.record(Call::Response {
            interaction: interaction.id,
            body: body.clone(),
        });
        Ok(())
    }

    async fn create_followup(&self, interaction: &InteractionRef, body: &Value) -> Result<MessageId> {
        self.record(Call::Followup {
            interaction: interaction.id,
            body: body.clone(),
        });
        Ok(self.new_message())
    }

    async fn original_response(&self, interaction: &InteractionRef) -> Result<MessageId> {
        self.record(Call::OriginalResponse {
            interaction: interaction.id,
        });
        Ok(self.new_message())
    }

    async fn edit_original_response(&self, interaction: &InteractionRef, body: &Value) -> Result<()> {
        self.record(Call::EditOriginal {
            interaction: interaction.id,
            body: body.clone(),
        });
        Ok(())
    }

    async fn edit_followup(
        &self,
        _interaction: &InteractionRef,
        message: MessageId,
        body: &Value,
    ) -> Result<()> {
        self.record(Call::EditFollowup {
            message,
            body: body.clone(),
        });
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, body: &Value) -> Result<MessageId> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(anyhow!("send rejected"));
        }
        self.record(Call::Send {
            channel,
            body: body.clone(),
        });
        Ok(self.new_message())
    }

    async fn edit_message(&self, channel: ChannelId, message: MessageId, body: &Value) -> Result<()> {
        self.record(Call::Edit {
            channel,
            message,
            body: body.clone(),
        });
        Ok(())
    }

    async fn send_file(
        &self,
        channel: ChannelId,
        content: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(anyhow!("upload rejected"));
        }
        self.record(Call::File {
            channel,
            content: content.to_string(),
            filename: filename.to_string(),
            data,
        });
        Ok(())
    }

    async fn broadcast_typing(&self, channel: ChannelId) -> Result<()> {
        self.record(Call::Typing { channel });
        Ok(())
    }

    async fn channel(&self, channel: ChannelId) -> Result<ChannelSummary> {
        self.channels
            .lock()
            .unwrap()
            .get(&channel)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown Channel"))
    }

    async fn permissions(&self, channel: ChannelId, user: UserId) -> Result<Permissions> {
        if self.fail_permissions.load(Ordering::SeqCst) {
            return Err(anyhow!("Missing Access"));
        }
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .get(&(channel, user))
            .copied()
            .unwrap_or_else(Permissions::empty))
    }

    fn current_user_id(&self) -> UserId {
        BOT_ID
    }
}
