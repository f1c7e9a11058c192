//! Owned, transport-independent copies of incoming gateway events
//!
//! Each dispatched task gets its own decoded event; nothing here borrows from
//! the serenity objects it was built from.

use serenity::model::application::command::{CommandOptionType, CommandType};
use serenity::model::application::component::ActionRowComponent;
use serenity::model::application::interaction::application_command::CommandDataOption;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

use crate::commands::definition::CommandKind;
use crate::commands::options::{OptionValue, Options};
use crate::session::InteractionRef;

/// Who triggered an invocation, and where
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invoker {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
}

/// A chat-input, context-menu or autocomplete interaction
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub interaction: InteractionRef,
    pub invoker: Invoker,
    pub name: String,
    pub kind: CommandKind,
    /// Subcommand group and subcommand names below `name`
    pub path: Vec<String>,
    pub options: Options,
}

#[derive(Debug, Clone)]
pub struct ComponentPress {
    pub interaction: InteractionRef,
    pub invoker: Invoker,
    pub custom_id: String,
    pub message_id: MessageId,
    /// Selected values for select menus
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModalSubmission {
    pub interaction: InteractionRef,
    pub invoker: Invoker,
    pub custom_id: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub enum InteractionEvent {
    Command(CommandInvocation),
    Autocomplete(CommandInvocation),
    Component(ComponentPress),
    Modal(ModalSubmission),
}

impl InteractionEvent {
    /// Decode a gateway interaction; pings have nothing to route and yield `None`
    pub fn decode(interaction: &Interaction) -> Option<Self> {
        let event = match interaction {
            Interaction::ApplicationCommand(command) => {
                let (path, mut options) = walk_options(&command.data.options);
                if let Some(target) = command.data.target_id {
                    options.set_target(target.0);
                }
                InteractionEvent::Command(CommandInvocation {
                    interaction: InteractionRef {
                        id: command.id,
                        token: command.token.clone(),
                    },
                    invoker: Invoker {
                        user_id: command.user.id,
                        channel_id: command.channel_id,
                        guild_id: command.guild_id,
                    },
                    name: command.data.name.clone(),
                    kind: command_kind(command.data.kind),
                    path,
                    options,
                })
            }
            Interaction::Autocomplete(autocomplete) => {
                let (path, options) = walk_options(&autocomplete.data.options);
                InteractionEvent::Autocomplete(CommandInvocation {
                    interaction: InteractionRef {
                        id: autocomplete.id,
                        token: autocomplete.token.clone(),
                    },
                    invoker: Invoker {
                        user_id: autocomplete.user.id,
                        channel_id: autocomplete.channel_id,
                        guild_id: autocomplete.guild_id,
                    },
                    name: autocomplete.data.name.clone(),
                    kind: command_kind(autocomplete.data.kind),
                    path,
                    options,
                })
            }
            Interaction::MessageComponent(component) => InteractionEvent::Component(ComponentPress {
                interaction: InteractionRef {
                    id: component.id,
                    token: component.token.clone(),
                },
                invoker: Invoker {
                    user_id: component.user.id,
                    channel_id: component.channel_id,
                    guild_id: component.guild_id,
                },
                custom_id: component.data.custom_id.clone(),
                message_id: component.message.id,
                values: component.data.values.clone(),
            }),
            Interaction::ModalSubmit(modal) => {
                let fields = modal
                    .data
                    .components
                    .iter()
                    .flat_map(|row| row.components.iter())
                    .filter_map(|component| match component {
                        ActionRowComponent::InputText(input) => {
                            Some((input.custom_id.clone(), input.value.clone()))
                        }
                        _ => None,
                    })
                    .collect();
                InteractionEvent::Modal(ModalSubmission {
                    interaction: InteractionRef {
                        id: modal.id,
                        token: modal.token.clone(),
                    },
                    invoker: Invoker {
                        user_id: modal.user.id,
                        channel_id: modal.channel_id,
                        guild_id: modal.guild_id,
                    },
                    custom_id: modal.data.custom_id.clone(),
                    fields,
                })
            }
            _ => return None,
        };
        Some(event)
    }
}

fn command_kind(kind: CommandType) -> CommandKind {
    match kind {
        CommandType::User => CommandKind::User,
        CommandType::Message => CommandKind::Message,
        _ => CommandKind::ChatInput,
    }
}

/// Split nested options into the subcommand path and the leaf's own options
pub(crate) fn walk_options(options: &[CommandDataOption]) -> (Vec<String>, Options) {
    let mut path = Vec::new();
    let mut out = Options::new();
    let mut level = options;

    'descend: loop {
        for option in level {
            if matches!(
                option.kind,
                CommandOptionType::SubCommand | CommandOptionType::SubCommandGroup
            ) {
                path.push(option.name.clone());
                level = &option.options;
                continue 'descend;
            }
        }
        break;
    }

    for option in level {
        if let Some(raw) = &option.value {
            // Focused input is partial text even for numeric options
            let decoded = OptionValue::decode(option.kind, raw).or_else(|| {
                option
                    .focused
                    .then(|| raw.as_str().map(|s| OptionValue::String(s.to_string())))
                    .flatten()
            });
            if let Some(value) = decoded {
                out.push(option.name.clone(), value);
            }
        }
        if option.focused {
            out.set_focused(option.name.clone());
        }
    }

    (path, out)
}

/// A plain channel message, as seen by the legacy prefix dispatcher
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub invoker: Invoker,
    pub author_bot: bool,
    pub content: String,
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id,
            invoker: Invoker {
                user_id: msg.author.id,
                channel_id: msg.channel_id,
                guild_id: msg.guild_id,
            },
            author_bot: msg.author.bot,
            content: msg.content.clone(),
        }
    }
}
