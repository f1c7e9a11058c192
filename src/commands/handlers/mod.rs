//! Built-in command handlers
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.0.0: Modules register their commands on the router through `init`
//! - 1.0.0: Initial extraction from monolithic command_handler.rs

pub mod utility;

use crate::command_handler::Router;

/// Register every built-in command
pub fn init(router: &mut Router) {
    utility::init(router);
}
