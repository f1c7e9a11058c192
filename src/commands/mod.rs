//! # Command System
//!
//! Command tree declaration, registry and resolution, the per-invocation
//! response context, and the built-in commands.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Command tree with flat route map, unified response context
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod channels;
pub mod context;
pub mod definition;
pub mod handlers;
pub mod options;
pub mod permissions;
pub mod registry;

pub use channels::ChannelRejection;
pub use context::{Ctx, Trigger};
pub use definition::{
    Autocompleter, Command, CommandKind, CommandOption, Executor, Handler, SubCommand,
    SubCommandGroup,
};
pub use options::{OptionValue, Options};
pub use registry::{CommandMap, CommandRegistry, Named, Route};
