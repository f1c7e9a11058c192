//! Pager button actions and page index transitions

/// Custom-id prefix reserved for pager buttons
pub const PAGER_PREFIX: &str = "pager";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerAction {
    First,
    Prev,
    Next,
    Last,
    Confirm,
}

impl PagerAction {
    pub fn custom_id(self) -> String {
        let action = match self {
            PagerAction::First => "first",
            PagerAction::Prev => "prev",
            PagerAction::Next => "next",
            PagerAction::Last => "last",
            PagerAction::Confirm => "confirm",
        };
        format!("{PAGER_PREFIX}:{action}")
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        let (prefix, action) = custom_id.split_once(':')?;
        if prefix != PAGER_PREFIX {
            return None;
        }
        match action {
            "first" => Some(PagerAction::First),
            "prev" => Some(PagerAction::Prev),
            "next" => Some(PagerAction::Next),
            "last" => Some(PagerAction::Last),
            "confirm" => Some(PagerAction::Confirm),
            _ => None,
        }
    }

    /// Page index after this action; wraps at both ends
    ///
    /// `len` must be non-zero. Confirm leaves the index unchanged.
    pub fn apply(self, index: usize, len: usize) -> usize {
        match self {
            PagerAction::First => 0,
            PagerAction::Last => len - 1,
            PagerAction::Prev => (index + len - 1) % len,
            PagerAction::Next => (index + 1) % len,
            PagerAction::Confirm => index,
        }
    }
}
