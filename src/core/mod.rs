//! # Core Module
//!
//! Configuration, outgoing payloads, status glyphs and panic capture shared by
//! every layer of the router.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add panic capture and typed router errors
//! - 1.1.0: Add reply payloads
//! - 1.0.0: Initial creation with config and page splitting

pub mod config;
pub mod error;
pub mod panic;
pub mod reply;
pub mod response;
pub mod status;

// Re-export commonly used items
pub use config::{Config, RouterConfig};
pub use error::RouterError;
pub use reply::{Choice, ChoiceValue, Page, Reply};
pub use response::{paginate_lines, split_pages, truncate_for_message, MESSAGE_LIMIT};
pub use status::{Status, GENERIC_ERROR};
