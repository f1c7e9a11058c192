//! # Feature: Startup Notification
//!
//! Posts an embed to the operational log channel when the bot comes online.
//! Only the first ready event of the process is announced; gateway
//! reconnects are skipped.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.0.0: Delivered through the router's log sink as a startup listener
//! - 1.0.0: Initial release with channel support, rich embeds

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use serenity::builder::CreateEmbed;
use serenity::utils::Color;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::Reply;
use crate::events::{EventCtx, Listener, Startup};

pub struct StartupNotifier {
    first_ready: AtomicBool,
}

impl StartupNotifier {
    pub fn new() -> Self {
        Self {
            first_ready: AtomicBool::new(true),
        }
    }

    fn build_embed(startup: &Startup, command_count: usize) -> CreateEmbed {
        let mut embed = CreateEmbed::default();
        embed
            .title(format!("{} is Online!", startup.user_name))
            .color(Color::from_rgb(87, 242, 135));
        embed.field("Guilds", startup.guild_count.to_string(), true);
        embed.field("Commands", command_count.to_string(), true);
        if let Some([index, total]) = startup.shard {
            embed.field("Shard", format!("{}/{}", index + 1, total), true);
        }
        embed.footer(|f| f.text(format!("Started {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))));
        embed
    }
}

impl Default for StartupNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener<Startup> for StartupNotifier {
    async fn on_event(&self, ctx: EventCtx, startup: Startup) -> Result<()> {
        if !self.first_ready.swap(false, Ordering::SeqCst) {
            info!("Skipping startup notification (reconnect, not initial startup)");
            return Ok(());
        }
        let sink = ctx.router.log_sink();
        let Some(channel) = sink.channel() else {
            info!("Startup notification skipped, no log channel configured");
            return Ok(());
        };

        let embed = Self::build_embed(&startup, ctx.router.commands().len());
        sink.notice(ctx.session.as_ref(), Reply::simple("", vec![embed])).await;
        info!("Sent startup notification to channel {channel}");
        Ok(())
    }
}
