//! # Feature: Operational Log Channel
//!
//! Forwards panic reports and lifecycle notices to a designated channel.
//! Forwarding is best effort: failures are logged locally and swallowed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.0.0: Panic reports with backtrace attachment, startup notices

use chrono::Utc;
use log::{debug, warn};
use serenity::model::id::ChannelId;
use uuid::Uuid;

use crate::core::panic::PanicReport;
use crate::core::{truncate_for_message, Reply, Status};
use crate::session::Session;

pub struct LogSink {
    channel: Option<ChannelId>,
}

impl LogSink {
    pub fn new(channel: Option<ChannelId>) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    /// Post a panic summary with the full backtrace as an attached file
    pub async fn report_panic(
        &self,
        session: &dyn Session,
        label: &str,
        request_id: Option<Uuid>,
        report: &PanicReport,
    ) {
        let Some(channel) = self.channel else {
            debug!("No log channel configured, panic in {label} not forwarded");
            return;
        };
        let request = request_id.map(|id| format!(" ({id})")).unwrap_or_default();
        let content = truncate_for_message(&Status::Error.decorate(&format!(
            "Panic in `{label}`{request}: {}",
            report.message
        )));
        let filename = format!("panic-{}.txt", Utc::now().format("%Y%m%d-%H%M%S"));
        let trace = format!(
            "{label}{request}\n{}\n\n{}",
            report.message, report.backtrace
        );

        if let Err(e) = session
            .send_file(channel, &content, &filename, trace.into_bytes())
            .await
        {
            warn!("Failed to forward panic report to log channel {channel}: {e:#}");
        }
    }

    /// Post a message to the log channel
    pub async fn notice(&self, session: &dyn Session, reply: Reply) {
        let Some(channel) = self.channel else {
            return;
        };
        if let Err(e) = session.send_message(channel, &reply.channel_body(None)).await {
            warn!("Failed to post notice to log channel {channel}: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::recording::{Call, RecordingSession};

    fn report() -> PanicReport {
        PanicReport {
            message: "index out of bounds".into(),
            backtrace: "0: herald::handler\n1: tokio::runtime".into(),
        }
    }

    #[tokio::test]
    async fn test_report_attaches_backtrace() {
        let session = RecordingSession::new();
        let sink = LogSink::new(Some(ChannelId(77)));
        let id = Uuid::new_v4();
        sink.report_panic(&session, "fm/top/artists", Some(id), &report()).await;

        let calls = session.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::File { channel, content, filename, data } => {
                assert_eq!(*channel, ChannelId(77));
                assert!(content.starts_with("❌ Panic in `fm/top/artists`"));
                assert!(content.contains(&id.to_string()));
                assert!(filename.starts_with("panic-") && filename.ends_with(".txt"));
                let trace = String::from_utf8_lossy(data);
                assert!(trace.contains("index out of bounds"));
                assert!(trace.contains("tokio::runtime"));
            }
            other => panic!("expected a file upload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_forwarding_failure_is_swallowed() {
        let session = RecordingSession::new();
        session.fail_sends();
        let sink = LogSink::new(Some(ChannelId(77)));
        sink.report_panic(&session, "ping", None, &report()).await;
        sink.notice(&session, Reply::text("online")).await;
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn test_without_channel_nothing_is_sent() {
        let session = RecordingSession::new();
        let sink = LogSink::new(None);
        sink.report_panic(&session, "ping", None, &report()).await;
        sink.notice(&session, Reply::text("online")).await;
        assert!(session.calls().is_empty());
    }
}
