// Core layer - shared types, configuration, panic capture
pub mod core;

// Transport seam between the router and the platform
pub mod session;

// Decoded gateway events and listener fan-out
pub mod events;

// Features layer - pagers, log channel, startup notice
pub mod features;

// Application layer
pub mod command_handler;
pub mod commands;

pub use command_handler::Router;
pub use core::{Config, RouterConfig, RouterError};
