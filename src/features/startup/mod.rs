//! # Startup Notification Feature
//!
//! Online notice posted to the operational log channel.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod notification;

pub use notification::StartupNotifier;
