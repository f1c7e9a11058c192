//! Command tree nodes
//!
//! A [`Command`] owns optional [`SubCommandGroup`]s and [`SubCommand`]s. Each
//! node carries a [`Handler`]; on the slash path only leaves are invoked, on
//! the legacy prefix path an intermediate node with an executor serves as the
//! fallback when no further token matches.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Context-menu commands and per-node permissions
//! - 1.0.0: Tree nodes replacing flat handler registration

use anyhow::Result;
use async_trait::async_trait;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::{CommandOptionType, CommandType};
use serenity::model::permissions::Permissions;
use std::future::Future;
use std::sync::Arc;

use super::context::Ctx;
use super::registry::{CommandMap, Named};
use crate::core::Choice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    #[default]
    ChatInput,
    /// Context menu on a user
    User,
    /// Context menu on a message
    Message,
}

impl From<CommandKind> for CommandType {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::ChatInput => CommandType::ChatInput,
            CommandKind::User => CommandType::User,
            CommandKind::Message => CommandType::Message,
        }
    }
}

/// Runs an invocation
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, ctx: Ctx) -> Result<()>;
}

#[async_trait]
impl<F, Fut> Executor for F
where
    F: Fn(Ctx) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn execute(&self, ctx: Ctx) -> Result<()> {
        (self)(ctx).await
    }
}

/// Produces suggestions for the focused option
#[async_trait]
pub trait Autocompleter: Send + Sync {
    async fn complete(&self, ctx: Ctx) -> Result<Vec<Choice>>;
}

#[async_trait]
impl<F, Fut> Autocompleter for F
where
    F: Fn(Ctx) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Choice>>> + Send + 'static,
{
    async fn complete(&self, ctx: Ctx) -> Result<Vec<Choice>> {
        (self)(ctx).await
    }
}

/// What runs when a node is invoked
#[derive(Clone, Default)]
pub struct Handler {
    pub executor: Option<Arc<dyn Executor>>,
    pub autocompleter: Option<Arc<dyn Autocompleter>>,
    /// Acknowledge before running the executor
    pub defer: bool,
    pub ephemeral: bool,
}

impl Handler {
    pub fn new(executor: impl Executor + 'static) -> Self {
        Self {
            executor: Some(Arc::new(executor)),
            ..Self::default()
        }
    }

    pub fn autocomplete(mut self, autocompleter: impl Autocompleter + 'static) -> Self {
        self.autocompleter = Some(Arc::new(autocompleter));
        self
    }

    pub fn deferred(mut self) -> Self {
        self.defer = true;
        self
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn is_runnable(&self) -> bool {
        self.executor.is_some()
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("executor", &self.executor.is_some())
            .field("autocompleter", &self.autocompleter.is_some())
            .field("defer", &self.defer)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// A typed option of a chat-input command
#[derive(Debug, Clone)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub kind: CommandOptionType,
    pub required: bool,
    pub autocomplete: bool,
    pub string_choices: Vec<(String, String)>,
    pub int_choices: Vec<(String, i32)>,
}

impl CommandOption {
    pub fn new(kind: CommandOptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            autocomplete: false,
            string_choices: Vec::new(),
            int_choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    pub fn string_choice(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.string_choices.push((name.into(), value.into()));
        self
    }

    pub fn int_choice(mut self, name: impl Into<String>, value: i32) -> Self {
        self.int_choices.push((name.into(), value));
        self
    }

    pub fn create_data(&self) -> CreateApplicationCommandOption {
        let mut option = CreateApplicationCommandOption::default();
        option
            .kind(self.kind)
            .name(&self.name)
            .description(&self.description)
            .required(self.required);
        if self.autocomplete {
            option.set_autocomplete(true);
        }
        for (name, value) in &self.string_choices {
            option.add_string_choice(name, value);
        }
        for (name, value) in &self.int_choices {
            option.add_int_choice(name, *value);
        }
        option
    }
}

/// Leaf of the command tree
#[derive(Debug, Clone)]
pub struct SubCommand {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub permissions: Option<Permissions>,
    pub handler: Handler,
    pub options: Vec<CommandOption>,
}

impl SubCommand {
    pub fn new(name: impl Into<String>, description: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            aliases: Vec::new(),
            permissions: None,
            handler,
            options: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn create_data(&self) -> CreateApplicationCommandOption {
        let mut data = CreateApplicationCommandOption::default();
        data.kind(CommandOptionType::SubCommand)
            .name(&self.name)
            .description(&self.description);
        for option in &self.options {
            data.add_sub_option(option.create_data());
        }
        data
    }
}

/// Named container of subcommands, one level below a [`Command`]
#[derive(Debug, Clone)]
pub struct SubCommandGroup {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub permissions: Option<Permissions>,
    /// Legacy fallback when no subcommand token follows
    pub handler: Handler,
    pub subcommands: CommandMap<SubCommand>,
}

impl SubCommandGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            aliases: Vec::new(),
            permissions: None,
            handler: Handler::default(),
            subcommands: CommandMap::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = handler;
        self
    }

    /// # Panics
    ///
    /// On an empty name or a name/alias already used in this group.
    pub fn add_sub_command(&mut self, sub: SubCommand) {
        self.subcommands.insert(sub);
    }

    pub fn sub_command(mut self, sub: SubCommand) -> Self {
        self.add_sub_command(sub);
        self
    }

    pub fn create_data(&self) -> CreateApplicationCommandOption {
        let mut data = CreateApplicationCommandOption::default();
        data.kind(CommandOptionType::SubCommandGroup)
            .name(&self.name)
            .description(&self.description);
        for sub in self.subcommands.iter() {
            data.add_sub_option(sub.create_data());
        }
        data
    }
}

/// Top-level node of the command tree
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub description: String,
    /// Extra names accepted by the legacy prefix dispatcher
    pub aliases: Vec<String>,
    pub permissions: Option<Permissions>,
    pub kind: CommandKind,
    pub handler: Handler,
    pub options: Vec<CommandOption>,
    pub groups: CommandMap<SubCommandGroup>,
    pub subcommands: CommandMap<SubCommand>,
}

impl Command {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            aliases: Vec::new(),
            permissions: None,
            kind: CommandKind::ChatInput,
            handler: Handler::default(),
            options: Vec::new(),
            groups: CommandMap::new(),
            subcommands: CommandMap::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = handler;
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.groups.is_empty() || !self.subcommands.is_empty()
    }

    /// # Panics
    ///
    /// On an empty name, or a name/alias already used by a subcommand or
    /// group of this command.
    pub fn add_sub_command(&mut self, sub: SubCommand) {
        self.reject_sibling(&sub, &self.groups);
        self.subcommands.insert(sub);
    }

    /// # Panics
    ///
    /// Same conditions as [`Command::add_sub_command`].
    pub fn add_sub_command_group(&mut self, group: SubCommandGroup) {
        self.reject_sibling(&group, &self.subcommands);
        self.groups.insert(group);
    }

    pub fn sub_command(mut self, sub: SubCommand) -> Self {
        self.add_sub_command(sub);
        self
    }

    pub fn sub_command_group(mut self, group: SubCommandGroup) -> Self {
        self.add_sub_command_group(group);
        self
    }

    // Groups and subcommands share one namespace below a command
    fn reject_sibling<T: Named, U: Named>(&self, node: &T, other: &CommandMap<U>) {
        for key in node.keys() {
            if other.get(key).is_some() {
                panic!(
                    "command '{}': '{}' is already registered at this level",
                    self.name, key
                );
            }
        }
    }

    pub fn create_data(&self) -> CreateApplicationCommand {
        let mut data = CreateApplicationCommand::default();
        data.name(&self.name).kind(self.kind.into());
        // Context-menu commands must not carry a description
        if self.kind == CommandKind::ChatInput {
            data.description(&self.description);
        }
        if let Some(permissions) = self.permissions {
            data.default_member_permissions(permissions);
        }
        for option in &self.options {
            data.add_option(option.create_data());
        }
        for group in self.groups.iter() {
            data.add_option(group.create_data());
        }
        for sub in self.subcommands.iter() {
            data.add_option(sub.create_data());
        }
        data
    }
}

impl Named for Command {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl Named for SubCommandGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl Named for SubCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}
