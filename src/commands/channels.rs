//! Validation of channel arguments
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Accessible/sendable checks with distinct rejection messages

use regex::Regex;
use serenity::model::id::{ChannelId, GuildId};
use serenity::model::permissions::Permissions;
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::Status;
use crate::session::{ChannelSummary, Session};

/// Why a channel argument was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelRejection {
    #[error("`{0}` is not a valid channel.")]
    Malformed(String),

    #[error("I can't see that channel.")]
    Inaccessible,

    #[error("That channel belongs to another server.")]
    ForeignGuild,

    #[error("That channel is not a text channel.")]
    NotText,

    #[error("I'm not allowed to send messages in that channel.")]
    CannotSend,

    #[error("Could not check my permissions in that channel.")]
    PermissionLookup,
}

impl ChannelRejection {
    /// Failed lookups are unexpected; everything else is a validation miss
    pub fn status(&self) -> Status {
        match self {
            ChannelRejection::PermissionLookup => Status::Error,
            _ => Status::Warning,
        }
    }
}

fn mention_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(?:<#(\d+)>|(\d+))$").ok())
        .as_ref()
}

/// Accepts a raw id or a `<#id>` mention
pub fn parse_channel_id(raw: &str) -> Option<ChannelId> {
    let caps = mention_pattern()?.captures(raw.trim())?;
    let digits = caps.get(1).or_else(|| caps.get(2))?;
    digits.as_str().parse::<u64>().ok().filter(|id| *id != 0).map(ChannelId)
}

/// Run every check in order, stopping at the first failure
pub async fn check_channel(
    session: &dyn Session,
    guild: Option<GuildId>,
    raw: &str,
    sendable: bool,
) -> Result<ChannelSummary, ChannelRejection> {
    let id = parse_channel_id(raw).ok_or_else(|| ChannelRejection::Malformed(raw.trim().to_string()))?;
    let summary = session
        .channel(id)
        .await
        .map_err(|_| ChannelRejection::Inaccessible)?;

    if guild.is_none() || summary.guild_id != guild {
        return Err(ChannelRejection::ForeignGuild);
    }
    if !summary.kind.is_text() {
        return Err(ChannelRejection::NotText);
    }

    let held = session
        .permissions(id, session.current_user_id())
        .await
        .map_err(|_| ChannelRejection::PermissionLookup)?;
    if !held.contains(Permissions::VIEW_CHANNEL) {
        return Err(ChannelRejection::Inaccessible);
    }
    if sendable && !held.contains(Permissions::SEND_MESSAGES) {
        return Err(ChannelRejection::CannotSend);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::recording::{RecordingSession, BOT_ID};
    use crate::session::ChannelKind;

    const GUILD: GuildId = GuildId(10);

    fn session() -> RecordingSession {
        let session = RecordingSession::new();
        for (id, guild, kind) in [
            (100, 10, ChannelKind::Text),
            (101, 11, ChannelKind::Text),
            (102, 10, ChannelKind::Voice),
        ] {
            session.add_channel(ChannelSummary {
                id: ChannelId(id),
                guild_id: Some(GuildId(guild)),
                name: format!("c{id}"),
                kind,
            });
        }
        session.grant(ChannelId(100), BOT_ID, Permissions::VIEW_CHANNEL);
        session
    }

    #[test]
    fn test_parse_channel_id() {
        assert_eq!(parse_channel_id("123"), Some(ChannelId(123)));
        assert_eq!(parse_channel_id(" <#456> "), Some(ChannelId(456)));
        assert_eq!(parse_channel_id("<@456>"), None);
        assert_eq!(parse_channel_id("general"), None);
        assert_eq!(parse_channel_id("0"), None);
    }

    #[tokio::test]
    async fn test_each_failure_is_distinct() {
        let session = session();
        let check = |raw: &'static str, sendable: bool| {
            let session = &session;
            async move { check_channel(session, Some(GUILD), raw, sendable).await }
        };

        assert_eq!(
            check("general", false).await.unwrap_err(),
            ChannelRejection::Malformed("general".into())
        );
        assert_eq!(check("999", false).await.unwrap_err(), ChannelRejection::Inaccessible);
        assert_eq!(check("101", false).await.unwrap_err(), ChannelRejection::ForeignGuild);
        assert_eq!(check("102", false).await.unwrap_err(), ChannelRejection::NotText);
        assert_eq!(check("<#100>", true).await.unwrap_err(), ChannelRejection::CannotSend);
        assert_eq!(check("100", false).await.unwrap().id, ChannelId(100));
    }

    #[tokio::test]
    async fn test_missing_view_is_inaccessible() {
        let session = session();
        session.grant(ChannelId(100), BOT_ID, Permissions::SEND_MESSAGES);
        let rejection = check_channel(&session, Some(GUILD), "100", true).await.unwrap_err();
        assert_eq!(rejection, ChannelRejection::Inaccessible);
    }

    #[tokio::test]
    async fn test_permission_lookup_failure_is_error() {
        let session = session();
        session.fail_permissions();
        let rejection = check_channel(&session, Some(GUILD), "100", false).await.unwrap_err();
        assert_eq!(rejection, ChannelRejection::PermissionLookup);
        assert_eq!(rejection.status(), Status::Error);
        assert_eq!(ChannelRejection::NotText.status(), Status::Warning);
    }

    #[tokio::test]
    async fn test_direct_messages_have_no_guild_channels() {
        let session = session();
        let rejection = check_channel(&session, None, "100", false).await.unwrap_err();
        assert_eq!(rejection, ChannelRejection::ForeignGuild);
    }
}
