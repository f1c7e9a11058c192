use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::application::command::Command as ApplicationCommand;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, Member};
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::*;
use std::sync::Arc;

use herald::command_handler::Router;
use herald::commands::handlers;
use herald::core::{panic, Config};
use herald::events::{GuildJoin, IncomingMessage, InteractionEvent, MemberLeave, Startup};
use herald::features::StartupNotifier;
use herald::session::{Session, SerenityHttp};

struct GatewayHandler {
    router: Arc<Router>,
    guild_id: Option<GuildId>,
}

impl GatewayHandler {
    fn session(ctx: &Context) -> Arc<dyn Session> {
        Arc::new(SerenityHttp::from_context(ctx))
    }

    /// Publish the command tree, to the development guild when one is configured
    async fn publish_commands(&self, ctx: &Context) -> Result<()> {
        let data = self.router.commands().create_data();
        let count = data.len();
        match self.guild_id {
            Some(guild_id) => {
                guild_id
                    .set_application_commands(&ctx.http, |commands| {
                        commands.set_application_commands(data)
                    })
                    .await?;
                info!("✅ Registered {count} commands for guild {guild_id} (development mode)");
            }
            None => {
                ApplicationCommand::set_global_application_commands(&ctx.http, |commands| {
                    commands.set_application_commands(data)
                })
                .await?;
                info!("✅ Registered {count} global commands");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        // Listeners see bot messages too; dispatch_prefix skips them
        let session = Self::session(&ctx);
        let message = IncomingMessage::from(&msg);
        self.router.emit_message(Arc::clone(&session), &message);
        self.router.dispatch_prefix(session, message).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        if let Err(e) = self.publish_commands(&ctx).await {
            error!("Failed to register commands: {e:#}");
        }

        self.router
            .emit_startup(Self::session(&ctx), &Startup::from(&ready));
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: bool) {
        if !is_new {
            debug!("Guild available: {} ({})", guild.name, guild.id);
            return;
        }
        info!("🆕 Joined new guild: {} ({})", guild.name, guild.id);
        self.router
            .emit_guild_join(Self::session(&ctx), &GuildJoin::from(&guild));
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        debug!("Member {} joined guild {}", new_member.user.id, new_member.guild_id);
        self.router.emit_member_join(Self::session(&ctx), &new_member);
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        debug!("Member {} left guild {guild_id}", user.id);
        self.router
            .emit_member_leave(Self::session(&ctx), &MemberLeave { guild_id, user });
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(event) = InteractionEvent::decode(&interaction) else {
            warn!("Ignoring unroutable interaction {:?}", interaction.kind());
            return;
        };
        self.router.dispatch_interaction(Self::session(&ctx), event).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    panic::install_hook();

    info!("Starting Herald Discord Bot...");

    let mut router = Router::new(config.router.clone());
    handlers::init(&mut router);
    router.register_startup_listener(StartupNotifier::new());
    info!(
        "📋 {} commands registered ({} routes)",
        router.commands().len(),
        router.commands().paths().len()
    );

    let handler = GatewayHandler {
        router: Arc::new(router),
        guild_id: config.guild_id,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
