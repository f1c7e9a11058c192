//! # Router
//!
//! Owns the command registry, the component/modal prefix tables, the event
//! listener lists, the live button pagers and the operational log sink, and
//! dispatches every incoming invocation to exactly one handler.
//!
//! Built once at startup through `&mut self` registration calls, then shared
//! read-only behind an `Arc` for the lifetime of the process.
//!
//! - **Version**: 3.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.1.0: Check subcommand permissions on slash invocations
//! - 3.0.0: Registry-driven dispatch with per-handler panic isolation
//! - 2.1.0: Component and modal routing by custom-id prefix
//! - 2.0.0: Legacy prefix commands resolved through the command tree
//! - 1.0.0: Initial release with slash command support

use log::{debug, error, info, warn};
use serenity::model::guild::Member;
use serenity::model::id::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::commands::permissions::{self, Gate};
use crate::commands::{
    Command, CommandKind, CommandRegistry, Ctx, Executor, Handler, Trigger,
};
use crate::core::{panic, RouterConfig};
use crate::events::{
    CommandInvocation, ComponentPress, EventCtx, GuildJoin, IncomingMessage, InteractionEvent,
    Listener, Listeners, MemberLeave, ModalSubmission, Startup,
};
use crate::features::paging::{PagerAction, PAGER_PREFIX};
use crate::features::{ButtonPagers, LogSink};
use crate::session::Session;

/// The part of a custom id before the first `:`
pub fn custom_id_prefix(custom_id: &str) -> &str {
    custom_id.split(':').next().unwrap_or(custom_id)
}

pub struct Router {
    config: RouterConfig,
    registry: CommandRegistry,
    components: HashMap<String, Arc<dyn Executor>>,
    modals: HashMap<String, Arc<dyn Executor>>,
    messages: Listeners<IncomingMessage>,
    guild_joins: Listeners<GuildJoin>,
    member_joins: Listeners<Member>,
    member_leaves: Listeners<MemberLeave>,
    startup: Listeners<Startup>,
    pagers: ButtonPagers,
    log_sink: LogSink,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            pagers: ButtonPagers::new(config.pager_timeout),
            log_sink: LogSink::new(config.log_channel),
            config,
            registry: CommandRegistry::new(),
            components: HashMap::new(),
            modals: HashMap::new(),
            messages: Listeners::new("message"),
            guild_joins: Listeners::new("guild join"),
            member_joins: Listeners::new("member join"),
            member_leaves: Listeners::new("member leave"),
            startup: Listeners::new("startup"),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn pagers(&self) -> &ButtonPagers {
        &self.pagers
    }

    pub fn log_sink(&self) -> &LogSink {
        &self.log_sink
    }

    /// Register a top-level command
    ///
    /// # Panics
    /// On an empty name, or a name or alias already taken at that level.
    pub fn add_command(&mut self, command: Command) {
        debug!("Registering command {}", command.name);
        self.registry.add_command(command);
    }

    /// Route component presses whose custom id starts with `prefix:`
    ///
    /// # Panics
    /// On an empty or duplicate prefix, or the prefix reserved for pagers.
    pub fn register_component_handler(&mut self, prefix: &str, handler: impl Executor + 'static) {
        Self::insert_prefix(&mut self.components, "component", prefix, Arc::new(handler));
    }

    /// Route modal submissions whose custom id starts with `prefix:`
    ///
    /// # Panics
    /// On an empty or duplicate prefix.
    pub fn register_modal_handler(&mut self, prefix: &str, handler: impl Executor + 'static) {
        Self::insert_prefix(&mut self.modals, "modal", prefix, Arc::new(handler));
    }

    fn insert_prefix(
        table: &mut HashMap<String, Arc<dyn Executor>>,
        kind: &str,
        prefix: &str,
        handler: Arc<dyn Executor>,
    ) {
        if prefix.is_empty() || prefix.contains(':') {
            panic!("invalid {kind} prefix {prefix:?}");
        }
        if prefix == PAGER_PREFIX {
            panic!("{kind} prefix {prefix:?} is reserved for button pagers");
        }
        if table.insert(prefix.to_string(), handler).is_some() {
            panic!("{kind} prefix {prefix:?} already registered");
        }
    }

    pub fn register_message_handler(&mut self, listener: impl Listener<IncomingMessage> + 'static) {
        self.messages.register(listener);
    }

    pub fn register_guild_join_handler(&mut self, listener: impl Listener<GuildJoin> + 'static) {
        self.guild_joins.register(listener);
    }

    pub fn register_member_join_handler(&mut self, listener: impl Listener<Member> + 'static) {
        self.member_joins.register(listener);
    }

    pub fn register_member_leave_handler(&mut self, listener: impl Listener<MemberLeave> + 'static) {
        self.member_leaves.register(listener);
    }

    pub fn register_startup_listener(&mut self, listener: impl Listener<Startup> + 'static) {
        self.startup.register(listener);
    }

    // ---------------------------------------------------------------------
    // Interactions
    // ---------------------------------------------------------------------

    pub async fn dispatch_interaction(self: &Arc<Self>, session: Arc<dyn Session>, event: InteractionEvent) {
        match event {
            InteractionEvent::Command(invocation) => self.dispatch_command(session, invocation).await,
            InteractionEvent::Autocomplete(invocation) => {
                self.dispatch_autocomplete(session, invocation).await
            }
            InteractionEvent::Component(press) => self.dispatch_component(session, press).await,
            InteractionEvent::Modal(submission) => self.dispatch_modal(session, submission).await,
        }
    }

    async fn dispatch_command(self: &Arc<Self>, session: Arc<dyn Session>, invocation: CommandInvocation) {
        let request_id = Uuid::new_v4();
        let invoker = invocation.invoker;
        info!(
            "[{}] 📥 Slash command received | Command: {} | Path: {:?} | User: {} | Channel: {} | Guild: {}",
            request_id,
            invocation.name,
            invocation.path,
            invoker.user_id,
            invoker.channel_id,
            invoker.guild_id.map(|id| id.to_string()).unwrap_or_else(|| "DM".to_string())
        );

        let Some(route) = self.registry.resolve_interaction(&invocation.name, &invocation.path) else {
            warn!(
                "[{request_id}] ❓ No route for /{} {}",
                invocation.name,
                invocation.path.join(" ")
            );
            return;
        };

        let ctx = Ctx::new(Arc::clone(self), session, Trigger::Command(invocation))
            .with_request_id(request_id);

        // Discord only knows the command-level permissions
        let unenforced = route.unenforced();
        if !unenforced.is_empty() && !self.authorize(&ctx, &unenforced).await {
            return;
        }
        self.run(ctx, &route.handler, &route.path).await;
    }

    async fn dispatch_autocomplete(self: &Arc<Self>, session: Arc<dyn Session>, invocation: CommandInvocation) {
        let request_id = Uuid::new_v4();
        let Some(route) = self.registry.resolve_interaction(&invocation.name, &invocation.path) else {
            debug!("[{request_id}] No route for autocomplete on {}", invocation.name);
            return;
        };
        let Some(completer) = route.handler.autocompleter.clone() else {
            debug!("[{request_id}] {} has no autocompleter", route.path);
            return;
        };

        let ctx = Ctx::new(Arc::clone(self), session, Trigger::Autocomplete(invocation))
            .with_request_id(request_id);
        match panic::catch(completer.complete(ctx.clone())).await {
            Ok(Ok(choices)) => {
                debug!("[{request_id}] 🔎 {} suggested {} choices", route.path, choices.len());
                if let Err(e) = ctx.respond_choices(&choices).await {
                    warn!("[{request_id}] ⚠️ Failed to send autocomplete choices: {e:#}");
                }
            }
            Ok(Err(e)) => warn!("[{request_id}] ⚠️ Autocomplete for {} failed: {e:#}", route.path),
            Err(report) => {
                error!(
                    "[{request_id}] 💥 Autocomplete for {} panicked: {}\n{}",
                    route.path, report.message, report.backtrace
                );
                let label = format!("{} (autocomplete)", route.path);
                self.log_sink
                    .report_panic(ctx.session().as_ref(), &label, Some(request_id), &report)
                    .await;
            }
        }
    }

    async fn dispatch_component(self: &Arc<Self>, session: Arc<dyn Session>, press: ComponentPress) {
        if PagerAction::parse(&press.custom_id).is_some() {
            match panic::catch(self.pagers.handle_press(session.as_ref(), &press)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("⚠️ Failed to answer pager press on message {}: {e:#}", press.message_id)
                }
                Err(report) => {
                    error!(
                        "💥 Pager press on message {} panicked: {}\n{}",
                        press.message_id, report.message, report.backtrace
                    );
                    self.log_sink
                        .report_panic(session.as_ref(), "pager", None, &report)
                        .await;
                }
            }
            return;
        }

        let prefix = custom_id_prefix(&press.custom_id).to_string();
        let Some(handler) = self.components.get(&prefix).cloned() else {
            debug!("No component handler for custom id {:?}", press.custom_id);
            return;
        };
        let request_id = Uuid::new_v4();
        info!(
            "[{request_id}] 🖱️ Component pressed | Custom id: {} | User: {}",
            press.custom_id, press.invoker.user_id
        );
        let ctx = Ctx::new(Arc::clone(self), session, Trigger::Component(press))
            .with_request_id(request_id);
        self.execute(ctx, handler, &format!("component {prefix}")).await;
    }

    async fn dispatch_modal(self: &Arc<Self>, session: Arc<dyn Session>, submission: ModalSubmission) {
        let prefix = custom_id_prefix(&submission.custom_id).to_string();
        let Some(handler) = self.modals.get(&prefix).cloned() else {
            debug!("No modal handler for custom id {:?}", submission.custom_id);
            return;
        };
        let request_id = Uuid::new_v4();
        info!(
            "[{request_id}] 📝 Modal submitted | Custom id: {} | User: {}",
            submission.custom_id, submission.invoker.user_id
        );
        let ctx = Ctx::new(Arc::clone(self), session, Trigger::Modal(submission))
            .with_request_id(request_id);
        self.execute(ctx, handler, &format!("modal {prefix}")).await;
    }

    // ---------------------------------------------------------------------
    // Legacy prefix commands
    // ---------------------------------------------------------------------

    /// Text after the prefix or bot mention, if `content` invokes the bot
    fn strip_invocation<'a>(&self, content: &'a str, bot: UserId) -> Option<&'a str> {
        let content = content.trim_start();
        if let Some(rest) = content.strip_prefix(self.config.prefix.as_str()) {
            return Some(rest);
        }
        [format!("<@{}>", bot.0), format!("<@!{}>", bot.0)]
            .iter()
            .find_map(|mention| content.strip_prefix(mention.as_str()))
    }

    pub async fn dispatch_prefix(self: &Arc<Self>, session: Arc<dyn Session>, message: IncomingMessage) {
        if message.author_bot {
            return;
        }
        let Some(rest) = self.strip_invocation(&message.content, session.current_user_id()) else {
            return;
        };
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        let Some((route, depth)) = self.registry.resolve_tokens(&tokens) else {
            debug!("Unknown text command {:?}", tokens.first());
            return;
        };
        if route.kind != CommandKind::ChatInput {
            debug!("{} is a context menu command, ignoring text invocation", route.path);
            return;
        }

        let request_id = Uuid::new_v4();
        let invoker = message.invoker;
        info!(
            "[{}] 🎯 Processing text command: {} | User: {} | Channel: {} | Guild: {}",
            request_id,
            route.path,
            invoker.user_id,
            invoker.channel_id,
            invoker.guild_id.map(|id| id.to_string()).unwrap_or_else(|| "DM".to_string())
        );

        let args = tokens[depth..].iter().map(|token| token.to_string()).collect();
        let ctx = Ctx::new(Arc::clone(self), session, Trigger::Message(message))
            .with_args(args)
            .with_request_id(request_id);

        if !route.permissions.is_empty() && !self.authorize(&ctx, &route.permissions).await {
            return;
        }
        self.run(ctx, &route.handler, &route.path).await;
    }

    /// Gate an invocation on the invoker's channel permissions
    ///
    /// Rejections are answered ephemerally where the trigger allows it.
    async fn authorize(&self, ctx: &Ctx, required: &serenity::model::permissions::Permissions) -> bool {
        let request_id = ctx.request_id();
        ctx.set_ephemeral(true);
        if ctx.guild_id().is_none() {
            debug!("[{request_id}] 🚫 Permission-gated command used in a DM");
            if let Err(e) = ctx.respond_warning("This command can only be used in a server.").await {
                warn!("[{request_id}] ⚠️ Failed to send DM rejection: {e:#}");
            }
            return false;
        }

        let gate = permissions::check(
            ctx.session().as_ref(),
            ctx.channel_id(),
            ctx.user_id(),
            *required,
            self.config.admin_override,
        )
        .await;
        let outcome = match gate {
            Ok(Gate::Allowed) => return true,
            Ok(Gate::Denied(missing)) => {
                debug!("[{request_id}] 🚫 Missing permissions: {missing:?}");
                ctx.respond_warning(&format!(
                    "You need the following permissions to use this command: {}",
                    missing.get_permission_names().join(", ")
                ))
                .await
            }
            Err(e) => {
                error!("[{request_id}] ❌ Failed to fetch permissions: {e:#}");
                ctx.respond_error("I couldn't check your permissions, please try again later.")
                    .await
            }
        };
        if let Err(e) = outcome {
            warn!("[{request_id}] ⚠️ Failed to send permission rejection: {e:#}");
        }
        false
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    async fn run(&self, ctx: Ctx, handler: &Handler, label: &str) {
        let request_id = ctx.request_id();
        let Some(executor) = handler.executor.clone() else {
            warn!("[{request_id}] ⚠️ {label} has no executor");
            self.report_failure(&ctx).await;
            return;
        };

        ctx.set_ephemeral(handler.ephemeral);
        if handler.defer {
            if let Err(e) = ctx.defer().await {
                error!("[{request_id}] ❌ Failed to defer {label}: {e:#}");
                return;
            }
        }
        self.execute(ctx, executor, label).await;
    }

    /// Run one handler call, recovering from errors and panics
    async fn execute(&self, ctx: Ctx, executor: Arc<dyn Executor>, label: &str) {
        let request_id = ctx.request_id();
        debug!("[{request_id}] ▶️ Running {label}");
        match panic::catch(executor.execute(ctx.clone())).await {
            Ok(Ok(())) => debug!("[{request_id}] ✅ {label} completed"),
            Ok(Err(e)) => {
                error!("[{request_id}] ❌ {label} failed: {e:#}");
                self.report_failure(&ctx).await;
            }
            Err(report) => {
                error!(
                    "[{request_id}] 💥 {label} panicked: {}\n{}",
                    report.message, report.backtrace
                );
                self.report_failure(&ctx).await;
                self.log_sink
                    .report_panic(ctx.session().as_ref(), label, Some(request_id), &report)
                    .await;
            }
        }
    }

    async fn report_failure(&self, ctx: &Ctx) {
        if let Err(e) = ctx.respond_generic_error().await {
            warn!(
                "[{}] ⚠️ Failed to send error response: {e:#}",
                ctx.request_id()
            );
        }
    }

    // ---------------------------------------------------------------------
    // Fan-out
    // ---------------------------------------------------------------------

    fn event_ctx(self: &Arc<Self>, session: Arc<dyn Session>) -> EventCtx {
        EventCtx {
            router: Arc::clone(self),
            session,
        }
    }

    pub fn emit_message(self: &Arc<Self>, session: Arc<dyn Session>, message: &IncomingMessage) -> Vec<JoinHandle<()>> {
        self.messages.emit(&self.event_ctx(session), message)
    }

    pub fn emit_guild_join(self: &Arc<Self>, session: Arc<dyn Session>, guild: &GuildJoin) -> Vec<JoinHandle<()>> {
        self.guild_joins.emit(&self.event_ctx(session), guild)
    }

    pub fn emit_member_join(self: &Arc<Self>, session: Arc<dyn Session>, member: &Member) -> Vec<JoinHandle<()>> {
        self.member_joins.emit(&self.event_ctx(session), member)
    }

    pub fn emit_member_leave(self: &Arc<Self>, session: Arc<dyn Session>, leave: &MemberLeave) -> Vec<JoinHandle<()>> {
        self.member_leaves.emit(&self.event_ctx(session), leave)
    }

    pub fn emit_startup(self: &Arc<Self>, session: Arc<dyn Session>, startup: &Startup) -> Vec<JoinHandle<()>> {
        self.startup.emit(&self.event_ctx(session), startup)
    }
}
