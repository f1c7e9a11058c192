//! Typed failures raised by the router core
//!
//! Everything else travels as `anyhow::Error`; these variants exist so callers
//! can `downcast_ref` and react to a specific condition.

use serenity::model::id::MessageId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("message {0} already has an active pager")]
    DuplicatePager(MessageId),

    #[error("interaction was already deferred")]
    AlreadyDeferred,

    #[error("interaction was already answered")]
    AlreadyResponded,

    #[error("{0} is not available for this trigger")]
    Unsupported(&'static str),

    #[error("paging needs at least one page")]
    NoPages,
}
