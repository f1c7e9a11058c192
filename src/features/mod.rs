//! # Features
//!
//! Router features layered over the core: button pagers, the operational log
//! channel and the startup notice.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Paging, operational log channel, startup notification

pub mod oplog;
pub mod paging;
pub mod startup;

pub use oplog::LogSink;
pub use paging::{ButtonPager, ButtonPagers, PagerAction};
pub use startup::StartupNotifier;
