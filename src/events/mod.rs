//! # Event Fan-out
//!
//! Broadcast-style gateway events (plain messages, guild joins, member joins and
//! leaves, ready) are delivered to every registered listener, each on its own
//! task with its own copy of the event.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Listener lists with per-listener panic isolation

pub mod decode;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error};
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::command_handler::Router;
use crate::core::panic;
use crate::session::Session;

pub use decode::{
    CommandInvocation, ComponentPress, IncomingMessage, InteractionEvent, Invoker, ModalSubmission,
};

/// Handles available to a listener
#[derive(Clone)]
pub struct EventCtx {
    pub router: Arc<Router>,
    pub session: Arc<dyn Session>,
}

/// The bot was added to a guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildJoin {
    pub guild_id: GuildId,
    pub name: String,
    pub member_count: u64,
}

impl From<&Guild> for GuildJoin {
    fn from(guild: &Guild) -> Self {
        Self {
            guild_id: guild.id,
            name: guild.name.clone(),
            member_count: guild.member_count,
        }
    }
}

/// A member left or was removed from a guild
#[derive(Debug, Clone)]
pub struct MemberLeave {
    pub guild_id: GuildId,
    pub user: User,
}

/// The gateway session became ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    pub user_name: String,
    pub guild_count: usize,
    /// `[index, total]`
    pub shard: Option<[u64; 2]>,
}

impl From<&Ready> for Startup {
    fn from(ready: &Ready) -> Self {
        Self {
            user_name: ready.user.name.clone(),
            guild_count: ready.guilds.len(),
            shard: ready.shard,
        }
    }
}

#[async_trait]
pub trait Listener<E: Send + 'static>: Send + Sync {
    async fn on_event(&self, ctx: EventCtx, event: E) -> Result<()>;
}

#[async_trait]
impl<E, F, Fut> Listener<E> for F
where
    E: Send + 'static,
    F: Fn(EventCtx, E) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn on_event(&self, ctx: EventCtx, event: E) -> Result<()> {
        (self)(ctx, event).await
    }
}

/// Ordered listeners for one event type
pub struct Listeners<E: Send + 'static> {
    event: &'static str,
    list: Vec<Arc<dyn Listener<E>>>,
}

impl<E: Clone + Send + 'static> Listeners<E> {
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            list: Vec::new(),
        }
    }

    pub fn register(&mut self, listener: impl Listener<E> + 'static) {
        self.list.push(Arc::new(listener));
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Spawn every listener on its own task
    ///
    /// Listeners start in registration order; completion order is not
    /// guaranteed. A failing or panicking listener never affects its siblings.
    pub fn emit(&self, ctx: &EventCtx, event: &E) -> Vec<JoinHandle<()>> {
        debug!("Fanning out {} to {} listeners", self.event, self.list.len());
        self.list
            .iter()
            .enumerate()
            .map(|(index, listener)| {
                let listener = Arc::clone(listener);
                let ctx = ctx.clone();
                let event = event.clone();
                let name = self.event;
                tokio::spawn(async move {
                    let sink_ctx = ctx.clone();
                    match panic::catch(listener.on_event(ctx, event)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => error!("{name} listener #{index} failed: {e:#}"),
                        Err(report) => {
                            error!(
                                "{name} listener #{index} panicked: {}\n{}",
                                report.message, report.backtrace
                            );
                            let label = format!("{name} listener #{index}");
                            sink_ctx
                                .router
                                .log_sink()
                                .report_panic(sink_ctx.session.as_ref(), &label, None, &report)
                                .await;
                        }
                    }
                })
            })
            .collect()
    }
}
