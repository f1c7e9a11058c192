//! Outgoing message payloads
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Bodies built through serenity's interaction and message builders
//! - 1.1.0: Autocomplete and modal response bodies
//! - 1.0.0: Reply/Page types and interaction response bodies

use serde_json::Value;
use serenity::builder::{
    CreateAutocompleteResponse, CreateComponents, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseData, CreateMessage,
};
use serenity::json::hashmap_to_json_map;
use serenity::model::application::interaction::{InteractionResponseType, MessageFlags};
use serenity::model::id::{ChannelId, MessageId};

/// Discord caps autocomplete answers at 25 entries
pub const MAX_CHOICES: usize = 25;

/// One precomputed page of a paged response
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub content: String,
    pub embeds: Vec<CreateEmbed>,
}

impl Page {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embeds: Vec::new(),
        }
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// Everything a single outgoing message can carry
///
/// `components: None` leaves existing components untouched on edits, while
/// an empty `CreateComponents` strips them.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
    pub components: Option<CreateComponents>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn simple(content: impl Into<String>, embeds: Vec<CreateEmbed>) -> Self {
        let content = content.into();
        Self {
            content: (!content.is_empty()).then_some(content),
            embeds,
            ..Self::default()
        }
    }

    pub fn with_components(mut self, components: CreateComponents) -> Self {
        self.components = Some(components);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Interaction callback data; edits cannot change flags, so `with_flags`
    /// is off for them
    pub fn data(&self, with_flags: bool) -> CreateInteractionResponseData<'static> {
        let mut data = CreateInteractionResponseData::default();
        data.content(self.content.as_deref().unwrap_or_default())
            .set_embeds(self.embeds.clone());
        if let Some(components) = &self.components {
            data.set_components(components.clone());
        }
        if with_flags && self.ephemeral {
            data.flags(MessageFlags::EPHEMERAL);
        }
        data
    }

    /// Body for followups and webhook messages
    pub fn message_body(&self) -> Value {
        Value::from(hashmap_to_json_map(self.data(true).0))
    }

    /// Body for in-place edits
    pub fn edit_body(&self) -> Value {
        Value::from(hashmap_to_json_map(self.data(false).0))
    }

    /// Body for a plain channel message, optionally replying to `reference`
    pub fn channel_body(&self, reference: Option<(ChannelId, MessageId)>) -> Value {
        let mut message = CreateMessage::default();
        message
            .content(self.content.as_deref().unwrap_or_default())
            .set_embeds(self.embeds.clone());
        if let Some(components) = &self.components {
            message.set_components(components.clone());
        }
        if let Some(reference) = reference {
            message.reference_message(reference);
        }
        Value::from(hashmap_to_json_map(message.0))
    }
}

impl From<Page> for Reply {
    fn from(page: Page) -> Self {
        Reply::simple(page.content, page.embeds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceValue {
    String(String),
    Integer(i64),
    Number(f64),
}

/// An autocomplete suggestion
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub name: String,
    pub value: ChoiceValue,
}

impl Choice {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ChoiceValue::String(value.into()),
        }
    }

    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: ChoiceValue::Integer(value),
        }
    }

    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: ChoiceValue::Number(value),
        }
    }

    fn add_to(&self, response: &mut CreateAutocompleteResponse) {
        match &self.value {
            ChoiceValue::String(value) => response.add_string_choice(&self.name, value),
            ChoiceValue::Integer(value) => response.add_int_choice(&self.name, *value),
            ChoiceValue::Number(value) => response.add_number_choice(&self.name, *value),
        };
    }
}

/// Interaction callback body, `data` omitted for bare acknowledgements
pub fn response_body(
    kind: InteractionResponseType,
    data: Option<CreateInteractionResponseData<'static>>,
) -> Value {
    let mut response = CreateInteractionResponse::default();
    response.kind(kind);
    if let Some(data) = data {
        response.interaction_response_data(move |d| {
            *d = data;
            d
        });
    }
    Value::from(hashmap_to_json_map(response.0))
}

pub fn deferred_body(ephemeral: bool) -> Value {
    let data = ephemeral.then(|| {
        let mut data = CreateInteractionResponseData::default();
        data.flags(MessageFlags::EPHEMERAL);
        data
    });
    response_body(InteractionResponseType::DeferredChannelMessageWithSource, data)
}

pub fn autocomplete_body(choices: &[Choice]) -> Value {
    let mut data = CreateAutocompleteResponse::default();
    for choice in choices.iter().take(MAX_CHOICES) {
        choice.add_to(&mut data);
    }
    let mut response = CreateInteractionResponse::default();
    response.kind(InteractionResponseType::Autocomplete);
    response
        .0
        .insert("data", Value::from(hashmap_to_json_map(data.0)));
    Value::from(hashmap_to_json_map(response.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serenity::model::application::component::ButtonStyle;

    const EPHEMERAL: u64 = MessageFlags::EPHEMERAL.bits();

    #[test]
    fn test_message_body_sets_ephemeral_flag() {
        let body = Reply::text("hi").ephemeral(true).message_body();
        assert_eq!(body["content"], "hi");
        assert_eq!(body["flags"], EPHEMERAL);
        assert!(body.get("components").is_none());
    }

    #[test]
    fn test_edit_body_never_carries_flags() {
        let body = Reply::text("hi").ephemeral(true).edit_body();
        assert!(body.get("flags").is_none());
    }

    #[test]
    fn test_empty_components_strip() {
        let body = Reply::text("done")
            .with_components(CreateComponents::default())
            .edit_body();
        assert_eq!(body["components"], json!([]));
    }

    #[test]
    fn test_components_serialized_as_rows() {
        let mut components = CreateComponents::default();
        components.create_action_row(|row| {
            row.create_button(|btn| {
                btn.custom_id("pager:next")
                    .label("▶")
                    .style(ButtonStyle::Secondary)
            })
        });
        let body = Reply::text("x").with_components(components).message_body();
        assert_eq!(body["components"][0]["type"], 1);
        assert_eq!(body["components"][0]["components"][0]["custom_id"], "pager:next");
    }

    #[test]
    fn test_embeds_copied() {
        let mut embed = CreateEmbed::default();
        embed.title("Top artists");
        let body = Reply::simple("", vec![embed]).message_body();
        assert_eq!(body["content"], "");
        assert_eq!(body["embeds"][0]["title"], "Top artists");
    }

    #[test]
    fn test_channel_body_references_message() {
        let body = Reply::text("pong")
            .ephemeral(true)
            .channel_body(Some((ChannelId(2), MessageId(30))));
        assert_eq!(body["message_reference"]["message_id"], "30");
        assert!(body.get("flags").is_none());
    }

    #[test]
    fn test_deferred_body_flags_only_when_ephemeral() {
        assert_eq!(deferred_body(false), json!({ "type": 5 }));
        assert_eq!(
            deferred_body(true),
            json!({ "type": 5, "data": { "flags": EPHEMERAL } })
        );
    }

    #[test]
    fn test_autocomplete_body_caps_choices() {
        let choices: Vec<_> = (0..40).map(|i| Choice::integer(format!("n{i}"), i)).collect();
        let body = autocomplete_body(&choices);
        assert_eq!(body["type"], 8);
        assert_eq!(body["data"]["choices"].as_array().map(Vec::len), Some(MAX_CHOICES));
        assert_eq!(body["data"]["choices"][3]["value"], 3);
    }
}
