//! Utility command handlers
//!
//! Handles: ping, help, say
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Declared as router commands, usable as slash and text commands
//! - 1.0.0: Extracted from command_handler.rs

use anyhow::Result;
use log::info;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

use crate::command_handler::Router;
use crate::commands::{Command, CommandOption, Ctx, Handler, Trigger};
use crate::core::{paginate_lines, Reply};

/// Command paths listed per help page
const HELP_PER_PAGE: usize = 10;

pub fn init(router: &mut Router) {
    router.add_command(Command::new("ping", "Test bot responsiveness").handler(Handler::new(ping)));

    router.add_command(
        Command::new("help", "List every available command")
            .alias("h")
            .alias("commands")
            .handler(Handler::new(help)),
    );

    router.add_command(
        Command::new("say", "Post a message in another channel as the bot")
            .permissions(Permissions::MANAGE_MESSAGES)
            .option(
                CommandOption::new(CommandOptionType::Channel, "channel", "Where to post")
                    .required(),
            )
            .option(CommandOption::new(CommandOptionType::String, "text", "What to say").required())
            .handler(Handler::new(say).ephemeral()),
    );
}

async fn ping(ctx: Ctx) -> Result<()> {
    ctx.respond_text("Pong!").await?;
    info!("[{}] Ping command completed for user {}", ctx.request_id(), ctx.user_id());
    Ok(())
}

async fn help(ctx: Ctx) -> Result<()> {
    let marker = match ctx.trigger() {
        Trigger::Message(_) => ctx.router().config().prefix.clone(),
        _ => "/".to_string(),
    };
    let mut lines = vec!["**Available Commands:**".to_string()];
    lines.extend(
        ctx.router()
            .commands()
            .paths()
            .into_iter()
            .map(|path| format!("`{marker}{}`", path.replace('/', " "))),
    );
    ctx.respond_paging(paginate_lines(&lines, HELP_PER_PAGE)).await
}

async fn say(ctx: Ctx) -> Result<()> {
    let (raw_channel, text) = match ctx.trigger() {
        Trigger::Message(_) => {
            let args = ctx.args();
            (args.first().cloned(), args.get(1..).map(|rest| rest.join(" ")))
        }
        _ => (
            ctx.options().channel("channel").map(|id| id.0.to_string()),
            ctx.options().string("text").map(str::to_string),
        ),
    };
    let (Some(raw_channel), Some(text)) = (raw_channel, text.filter(|t| !t.trim().is_empty())) else {
        return ctx.respond_warning("Usage: say <channel> <text>").await;
    };

    let Some(channel) = ctx.parse_sendable_channel(&raw_channel).await? else {
        return Ok(());
    };
    ctx.session()
        .send_message(channel.id, &Reply::text(text).channel_body(None))
        .await?;
    info!("[{}] Posted message to #{} for {}", ctx.request_id(), channel.name, ctx.user_id());
    ctx.respond_success(&format!("Message sent to <#{}>.", channel.id.0))
        .await
}
