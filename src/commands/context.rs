//! Per-invocation response context
//!
//! One [`Ctx`] type serves every trigger: slash and context-menu commands,
//! autocomplete, component presses, modal submits and legacy prefix
//! messages. It tracks whether the invocation was deferred or answered and
//! picks the matching transport call, so handlers never choose between the
//! initial response, followup and channel APIs themselves.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Strip pager buttons when the pager cannot be tracked
//! - 2.0.0: Unified context replacing per-trigger response helpers
//! - 1.1.0: Paged responses through the button pager
//! - 1.0.0: Initial implementation with core shared state

use anyhow::Result;
use log::{debug, warn};
use serenity::builder::{CreateComponents, CreateEmbed, CreateInteractionResponseData};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::channels::check_channel;
use super::options::Options;
use crate::command_handler::Router;
use crate::core::reply::{autocomplete_body, deferred_body, response_body};
use crate::core::{Choice, Page, Reply, RouterError, Status, GENERIC_ERROR};
use crate::events::{CommandInvocation, ComponentPress, IncomingMessage, Invoker, ModalSubmission};
use crate::features::paging::{pager_rows, ButtonPager};
use crate::session::{ChannelSummary, InteractionRef, MessageRef, Session};

/// What started an invocation
#[derive(Debug, Clone)]
pub enum Trigger {
    Command(CommandInvocation),
    Autocomplete(CommandInvocation),
    Component(ComponentPress),
    Modal(ModalSubmission),
    Message(IncomingMessage),
}

impl Trigger {
    pub fn invoker(&self) -> Invoker {
        match self {
            Trigger::Command(c) | Trigger::Autocomplete(c) => c.invoker,
            Trigger::Component(c) => c.invoker,
            Trigger::Modal(m) => m.invoker,
            Trigger::Message(m) => m.invoker,
        }
    }

    pub fn interaction(&self) -> Option<&InteractionRef> {
        match self {
            Trigger::Command(c) | Trigger::Autocomplete(c) => Some(&c.interaction),
            Trigger::Component(c) => Some(&c.interaction),
            Trigger::Modal(m) => Some(&m.interaction),
            Trigger::Message(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    /// Acknowledged without content; replies go to followups
    Deferred,
    Responded,
}

struct Shared {
    phase: Mutex<Phase>,
    ephemeral: AtomicBool,
}

/// A message just sent, before its id is known
enum Sent {
    Original(InteractionRef),
    Message(MessageRef),
}

/// Handle passed to every executor and autocompleter
///
/// Clones share the response state of the same invocation.
#[derive(Clone)]
pub struct Ctx {
    router: Arc<Router>,
    session: Arc<dyn Session>,
    trigger: Arc<Trigger>,
    options: Arc<Options>,
    args: Arc<Vec<String>>,
    request_id: Uuid,
    shared: Arc<Shared>,
}

impl Ctx {
    pub fn new(router: Arc<Router>, session: Arc<dyn Session>, trigger: Trigger) -> Self {
        let options = match &trigger {
            Trigger::Command(c) | Trigger::Autocomplete(c) => c.options.clone(),
            _ => Options::new(),
        };
        Self {
            router,
            session,
            trigger: Arc::new(trigger),
            options: Arc::new(options),
            args: Arc::new(Vec::new()),
            request_id: Uuid::new_v4(),
            shared: Arc::new(Shared {
                phase: Mutex::new(Phase::Fresh),
                ephemeral: AtomicBool::new(false),
            }),
        }
    }

    /// Tokens left over after legacy command resolution
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = Arc::new(args);
        self
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn invoker(&self) -> Invoker {
        self.trigger.invoker()
    }

    pub fn user_id(&self) -> UserId {
        self.invoker().user_id
    }

    pub fn channel_id(&self) -> ChannelId {
        self.invoker().channel_id
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.invoker().guild_id
    }

    pub fn is_ephemeral(&self) -> bool {
        self.shared.ephemeral.load(Ordering::SeqCst)
    }

    /// Mark every later response of this invocation as visible to the invoker only
    pub fn set_ephemeral(&self, ephemeral: bool) {
        self.shared.ephemeral.store(ephemeral, Ordering::SeqCst);
    }

    pub async fn is_deferred(&self) -> bool {
        *self.shared.phase.lock().await == Phase::Deferred
    }

    fn interaction(&self, operation: &'static str) -> Result<&InteractionRef, RouterError> {
        self.trigger
            .interaction()
            .ok_or(RouterError::Unsupported(operation))
    }

    fn ensure_fresh(phase: Phase) -> Result<(), RouterError> {
        match phase {
            Phase::Fresh => Ok(()),
            Phase::Deferred => Err(RouterError::AlreadyDeferred),
            Phase::Responded => Err(RouterError::AlreadyResponded),
        }
    }

    /// Acknowledge now and answer later through followups
    ///
    /// On a legacy message this shows the typing indicator instead.
    pub async fn defer(&self) -> Result<()> {
        let mut phase = self.shared.phase.lock().await;
        Self::ensure_fresh(*phase)?;
        match self.trigger.as_ref() {
            Trigger::Autocomplete(_) => return Err(RouterError::Unsupported("defer").into()),
            Trigger::Message(msg) => self.session.broadcast_typing(msg.invoker.channel_id).await?,
            _ => {
                let interaction = self.interaction("defer")?;
                let body = deferred_body(self.is_ephemeral());
                self.session.create_response(interaction, &body).await?;
            }
        }
        *phase = Phase::Deferred;
        debug!("[{}] Deferred response", self.request_id);
        Ok(())
    }

    /// Acknowledge a component press without touching its message
    pub async fn defer_update(&self) -> Result<()> {
        let mut phase = self.shared.phase.lock().await;
        let Trigger::Component(press) = self.trigger.as_ref() else {
            return Err(RouterError::Unsupported("defer_update").into());
        };
        Self::ensure_fresh(*phase)?;
        let body = response_body(InteractionResponseType::DeferredUpdateMessage, None);
        self.session.create_response(&press.interaction, &body).await?;
        *phase = Phase::Responded;
        Ok(())
    }

    pub async fn respond(&self, reply: Reply) -> Result<()> {
        self.deliver(reply).await.map(|_| ())
    }

    async fn deliver(&self, mut reply: Reply) -> Result<Sent> {
        reply.ephemeral |= self.is_ephemeral();
        let mut phase = self.shared.phase.lock().await;
        let sent = match self.trigger.as_ref() {
            Trigger::Autocomplete(_) => return Err(RouterError::Unsupported("respond").into()),
            Trigger::Message(msg) => {
                let channel = msg.invoker.channel_id;
                let body = reply.channel_body(Some((channel, msg.id)));
                let message = self.session.send_message(channel, &body).await?;
                Sent::Message(MessageRef::Channel { channel, message })
            }
            _ => {
                let interaction = self.interaction("respond")?;
                if *phase == Phase::Fresh {
                    let body = response_body(
                        InteractionResponseType::ChannelMessageWithSource,
                        Some(reply.data(true)),
                    );
                    self.session.create_response(interaction, &body).await?;
                    Sent::Original(interaction.clone())
                } else {
                    let message = self
                        .session
                        .create_followup(interaction, &reply.message_body())
                        .await?;
                    Sent::Message(MessageRef::Followup {
                        interaction: interaction.clone(),
                        message,
                    })
                }
            }
        };
        if *phase == Phase::Fresh {
            *phase = Phase::Responded;
        }
        Ok(sent)
    }

    async fn resolve(&self, sent: Sent) -> Result<MessageRef> {
        match sent {
            Sent::Message(target) => Ok(target),
            Sent::Original(interaction) => {
                let message = self.session.original_response(&interaction).await?;
                Ok(MessageRef::Original {
                    interaction,
                    message,
                })
            }
        }
    }

    pub async fn respond_text(&self, content: impl Into<String>) -> Result<()> {
        self.respond(Reply::text(content)).await
    }

    pub async fn respond_embed(&self, embed: CreateEmbed) -> Result<()> {
        self.respond(Reply::simple("", vec![embed])).await
    }

    pub async fn respond_simple(&self, content: impl Into<String>, embeds: Vec<CreateEmbed>) -> Result<()> {
        self.respond(Reply::simple(content, embeds)).await
    }

    pub async fn respond_success(&self, text: &str) -> Result<()> {
        self.respond_text(Status::Success.decorate(text)).await
    }

    pub async fn respond_warning(&self, text: &str) -> Result<()> {
        self.respond_text(Status::Warning.decorate(text)).await
    }

    pub async fn respond_error(&self, text: &str) -> Result<()> {
        self.respond_text(Status::Error.decorate(text)).await
    }

    pub async fn respond_generic_error(&self) -> Result<()> {
        self.respond_error(GENERIC_ERROR).await
    }

    /// Send `pages` behind navigation buttons
    ///
    /// A single page is sent exactly like [`Ctx::respond_simple`].
    pub async fn respond_paging(&self, pages: Vec<Page>) -> Result<()> {
        self.page(pages, false).await
    }

    /// Like [`Ctx::respond_paging`], with a button that settles on the current page
    pub async fn respond_confirmation_paging(&self, pages: Vec<Page>) -> Result<()> {
        self.page(pages, true).await
    }

    async fn page(&self, mut pages: Vec<Page>, confirm: bool) -> Result<()> {
        if pages.len() <= 1 {
            let Some(page) = pages.pop() else {
                return Err(RouterError::NoPages.into());
            };
            return self.respond_simple(page.content, page.embeds).await;
        }

        let first = Reply::from(pages[0].clone());
        let sent = self
            .deliver(first.clone().with_components(pager_rows(confirm, false)))
            .await?;
        let target = self.resolve(sent).await?;
        let pager = ButtonPager::new(self.user_id(), target.clone(), pages, confirm)?;
        if let Err(e) = self.router.pagers().register(Arc::clone(&self.session), pager) {
            // Nothing will answer these buttons
            let settled = first.with_components(CreateComponents::default());
            if let Err(edit) = target.edit(self.session.as_ref(), &settled.edit_body()).await {
                warn!(
                    "[{}] Failed to strip pager buttons from message {}: {edit:#}",
                    self.request_id,
                    target.id()
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Edit the message a component sits on
    pub async fn update_message(&self, reply: Reply) -> Result<()> {
        let mut phase = self.shared.phase.lock().await;
        let Trigger::Component(press) = self.trigger.as_ref() else {
            return Err(RouterError::Unsupported("update_message").into());
        };
        if *phase == Phase::Fresh {
            let body = response_body(InteractionResponseType::UpdateMessage, Some(reply.data(false)));
            self.session.create_response(&press.interaction, &body).await?;
            *phase = Phase::Responded;
        } else {
            self.session
                .edit_original_response(&press.interaction, &reply.edit_body())
                .await?;
        }
        Ok(())
    }

    /// Open a modal; only possible as the first answer to a command or component
    ///
    /// `build` fills in the custom id, title and input rows.
    pub async fn show_modal<F>(&self, build: F) -> Result<()>
    where
        F: Send
            + for<'b> FnOnce(
                &'b mut CreateInteractionResponseData<'static>,
            ) -> &'b mut CreateInteractionResponseData<'static>,
    {
        let mut modal = CreateInteractionResponseData::default();
        build(&mut modal);
        let body = response_body(InteractionResponseType::Modal, Some(modal));
        let mut phase = self.shared.phase.lock().await;
        if !matches!(
            self.trigger.as_ref(),
            Trigger::Command(_) | Trigger::Component(_)
        ) {
            return Err(RouterError::Unsupported("show_modal").into());
        }
        Self::ensure_fresh(*phase)?;
        let interaction = self.interaction("show_modal")?;
        self.session.create_response(interaction, &body).await?;
        *phase = Phase::Responded;
        Ok(())
    }

    pub(crate) async fn respond_choices(&self, choices: &[Choice]) -> Result<()> {
        let Trigger::Autocomplete(invocation) = self.trigger.as_ref() else {
            return Err(RouterError::Unsupported("autocomplete").into());
        };
        self.session
            .create_response(&invocation.interaction, &autocomplete_body(choices))
            .await
    }

    /// Validate a channel argument the bot must be able to read
    ///
    /// On rejection the invoker is told why and `None` is returned.
    pub async fn parse_accessible_channel(&self, raw: &str) -> Result<Option<ChannelSummary>> {
        self.parse_channel(raw, false).await
    }

    /// Validate a channel argument the bot must be able to post in
    pub async fn parse_sendable_channel(&self, raw: &str) -> Result<Option<ChannelSummary>> {
        self.parse_channel(raw, true).await
    }

    async fn parse_channel(&self, raw: &str, sendable: bool) -> Result<Option<ChannelSummary>> {
        match check_channel(self.session.as_ref(), self.guild_id(), raw, sendable).await {
            Ok(summary) => Ok(Some(summary)),
            Err(rejection) => {
                debug!("[{}] Channel argument rejected: {rejection}", self.request_id);
                self.respond_text(rejection.status().decorate(&rejection.to_string()))
                    .await?;
                Ok(None)
            }
        }
    }
}
