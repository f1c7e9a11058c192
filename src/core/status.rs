//! Outcome glyphs for user-facing responses
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Success/warning/error prefixes shared by every response surface

/// Text shown when a handler fails in a way the user cannot act on
pub const GENERIC_ERROR: &str = "Something went wrong while running that command.";

/// Outcome of an invocation as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    pub fn glyph(self) -> &'static str {
        match self {
            Status::Success => "✅",
            Status::Warning => "⚠️",
            Status::Error => "❌",
        }
    }

    /// Prefix `text` with this status' glyph
    pub fn decorate(self, text: &str) -> String {
        format!("{} {text}", self.glyph())
    }
}
