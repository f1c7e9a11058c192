//! # Feature: Button Pager
//!
//! Turns a list of precomputed pages into a button-driven paginator on one
//! message. Each pager lives until its owner confirms it or its own expiry
//! timer fires, whichever happens first.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Button rows built with serenity component builders
//! - 1.1.0: Confirm button and silent acknowledgement of stale presses
//! - 1.0.0: Per-message pagers with wraparound navigation and expiry

pub mod buttons;
pub mod state;

use anyhow::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use serenity::builder::CreateComponents;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::{MessageId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::core::reply::response_body;
use crate::core::{Page, Reply, RouterError};
use crate::events::ComponentPress;
use crate::session::{MessageRef, Session};

pub use buttons::pager_rows;
pub use state::{PagerAction, PAGER_PREFIX};

/// Paging state of one message
#[derive(Debug)]
pub struct ButtonPager {
    owner: UserId,
    target: MessageRef,
    pages: Vec<Page>,
    index: usize,
    confirm: bool,
    /// Set by whoever removes the pager from the registry
    closed: bool,
}

impl ButtonPager {
    pub fn new(
        owner: UserId,
        target: MessageRef,
        pages: Vec<Page>,
        confirm: bool,
    ) -> Result<Self, RouterError> {
        if pages.is_empty() {
            return Err(RouterError::NoPages);
        }
        Ok(Self {
            owner,
            target,
            pages,
            index: 0,
            confirm,
            closed: false,
        })
    }

    pub fn message_id(&self) -> MessageId {
        self.target.id()
    }

    /// Current page with its button row
    pub fn render(&self, disabled: bool) -> Reply {
        Reply::from(self.pages[self.index].clone()).with_components(pager_rows(self.confirm, disabled))
    }
}

type Slot = Arc<Mutex<ButtonPager>>;

/// Live pagers keyed by message id
pub struct ButtonPagers {
    pagers: Arc<DashMap<MessageId, Slot>>,
    timeout: Duration,
}

impl ButtonPagers {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pagers: Arc::new(DashMap::new()),
            timeout,
        }
    }

    /// Track `pager` and start its expiry timer
    ///
    /// Fails without touching the existing pager if the message already has
    /// one. The returned handle completes once the pager has expired.
    pub fn register(
        &self,
        session: Arc<dyn Session>,
        pager: ButtonPager,
    ) -> Result<JoinHandle<()>, RouterError> {
        let id = pager.message_id();
        let slot: Slot = Arc::new(Mutex::new(pager));
        match self.pagers.entry(id) {
            Entry::Occupied(_) => return Err(RouterError::DuplicatePager(id)),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&slot));
            }
        }
        debug!("Registered pager on message {id}");

        let pagers = Arc::clone(&self.pagers);
        let deadline = Instant::now() + self.timeout;
        Ok(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            expire(&pagers, id, &slot, session.as_ref()).await;
        }))
    }

    pub fn contains(&self, message: MessageId) -> bool {
        self.pagers.contains_key(&message)
    }

    pub fn len(&self) -> usize {
        self.pagers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pagers.is_empty()
    }

    /// Index of the page currently shown on `message`
    pub async fn current_page(&self, message: MessageId) -> Option<usize> {
        let slot = self.pagers.get(&message).map(|entry| Arc::clone(entry.value()))?;
        let pager = slot.lock().await;
        Some(pager.index)
    }

    /// Answer a press on one of the pager buttons
    ///
    /// Presses by anyone but the owner get no response at all. Presses that
    /// change nothing, or that arrive after the pager closed, are acknowledged
    /// without an update.
    pub async fn handle_press(&self, session: &dyn Session, press: &ComponentPress) -> Result<()> {
        let Some(action) = PagerAction::parse(&press.custom_id) else {
            return Ok(());
        };
        let ack = response_body(InteractionResponseType::DeferredUpdateMessage, None);
        let slot = self
            .pagers
            .get(&press.message_id)
            .map(|entry| Arc::clone(entry.value()));
        let Some(slot) = slot else {
            debug!("Stale pager button on message {}", press.message_id);
            return session.create_response(&press.interaction, &ack).await;
        };

        let mut pager = slot.lock().await;
        if pager.owner != press.invoker.user_id {
            debug!(
                "Ignoring pager press by {} on message {}",
                press.invoker.user_id, press.message_id
            );
            return Ok(());
        }
        if pager.closed {
            return session.create_response(&press.interaction, &ack).await;
        }

        if action == PagerAction::Confirm {
            if !self.remove(press.message_id, &slot) {
                // Expiry won the race and will disable the buttons
                return session.create_response(&press.interaction, &ack).await;
            }
            pager.closed = true;
            let last = Reply::from(pager.pages[pager.index].clone())
                .with_components(CreateComponents::default());
            let body = response_body(InteractionResponseType::UpdateMessage, Some(last.data(false)));
            return session.create_response(&press.interaction, &body).await;
        }

        let next = action.apply(pager.index, pager.pages.len());
        if next == pager.index {
            return session.create_response(&press.interaction, &ack).await;
        }
        pager.index = next;
        let body = response_body(
            InteractionResponseType::UpdateMessage,
            Some(pager.render(false).data(false)),
        );
        session.create_response(&press.interaction, &body).await
    }

    fn remove(&self, message: MessageId, slot: &Slot) -> bool {
        self.pagers
            .remove_if(&message, |_, current| Arc::ptr_eq(current, slot))
            .is_some()
    }
}

async fn expire(
    pagers: &DashMap<MessageId, Slot>,
    message: MessageId,
    slot: &Slot,
    session: &dyn Session,
) {
    if pagers
        .remove_if(&message, |_, current| Arc::ptr_eq(current, slot))
        .is_none()
    {
        return;
    }
    let mut pager = slot.lock().await;
    pager.closed = true;
    debug!("Pager on message {message} expired");
    let body = pager.render(true).edit_body();
    if let Err(e) = pager.target.edit(session, &body).await {
        warn!("Failed to disable pager buttons on message {message}: {e:#}");
    }
}
