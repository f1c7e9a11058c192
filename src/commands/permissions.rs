//! Permission gate for legacy prefix invocations
//!
//! Slash commands declare `default_member_permissions` and the platform
//! enforces them; prefix commands are checked here before execution.

use anyhow::Result;
use serenity::model::id::{ChannelId, UserId};
use serenity::model::permissions::Permissions;

use crate::session::Session;

/// Outcome of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allowed,
    /// Permissions the invoker lacks
    Denied(Permissions),
}

pub fn satisfies(held: Permissions, required: Permissions, admin_override: bool) -> bool {
    if required.is_empty() || held.contains(required) {
        return true;
    }
    admin_override && held.contains(Permissions::ADMINISTRATOR)
}

/// Check `user`'s effective permissions in `channel`
///
/// A failed lookup is returned as `Err`, distinct from a denial.
pub async fn check(
    session: &dyn Session,
    channel: ChannelId,
    user: UserId,
    required: Permissions,
    admin_override: bool,
) -> Result<Gate> {
    if required.is_empty() {
        return Ok(Gate::Allowed);
    }
    let held = session.permissions(channel, user).await?;
    if satisfies(held, required, admin_override) {
        Ok(Gate::Allowed)
    } else {
        Ok(Gate::Denied(required - held))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::recording::RecordingSession;

    #[test]
    fn test_satisfies() {
        let manage = Permissions::MANAGE_MESSAGES;
        assert!(satisfies(Permissions::empty(), Permissions::empty(), false));
        assert!(satisfies(manage | Permissions::SEND_MESSAGES, manage, false));
        assert!(!satisfies(Permissions::SEND_MESSAGES, manage, true));
        assert!(satisfies(Permissions::ADMINISTRATOR, manage, true));
        assert!(!satisfies(Permissions::ADMINISTRATOR, manage, false));
    }

    #[tokio::test]
    async fn test_check_reports_missing() {
        let session = RecordingSession::new();
        session.grant(ChannelId(1), UserId(2), Permissions::SEND_MESSAGES);
        let required = Permissions::SEND_MESSAGES | Permissions::KICK_MEMBERS;
        let gate = check(&session, ChannelId(1), UserId(2), required, true).await.unwrap();
        assert_eq!(gate, Gate::Denied(Permissions::KICK_MEMBERS));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_error() {
        let session = RecordingSession::new();
        session.fail_permissions();
        let result = check(&session, ChannelId(1), UserId(2), Permissions::KICK_MEMBERS, true).await;
        assert!(result.is_err());
        // Nothing required, nothing looked up
        let gate = check(&session, ChannelId(1), UserId(2), Permissions::empty(), true).await;
        assert_eq!(gate.unwrap(), Gate::Allowed);
    }
}
