//! Button row attached to paged messages

use serenity::builder::CreateComponents;
use serenity::model::application::component::ButtonStyle;

use super::state::PagerAction;

const NAVIGATION: [(PagerAction, &str); 4] = [
    (PagerAction::First, "⏮"),
    (PagerAction::Prev, "◀"),
    (PagerAction::Next, "▶"),
    (PagerAction::Last, "⏭"),
];

/// Navigation buttons, plus a confirm button when `confirm` is set
pub fn pager_rows(confirm: bool, disabled: bool) -> CreateComponents {
    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        for (action, label) in NAVIGATION {
            row.create_button(|btn| {
                btn.custom_id(action.custom_id())
                    .label(label)
                    .style(ButtonStyle::Secondary)
                    .disabled(disabled)
            });
        }
        if confirm {
            row.create_button(|btn| {
                btn.custom_id(PagerAction::Confirm.custom_id())
                    .label("Done")
                    .style(ButtonStyle::Success)
                    .disabled(disabled)
            });
        }
        row
    });
    components
}
