//! Command registry
//!
//! The tree of [`Command`]s is kept for export, and a flat route map keyed by
//! the `/`-joined canonical path (`"fm/top/artists"`) is built alongside it at
//! registration time so interaction dispatch is a single hash lookup.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Command tree with flat route map and legacy token resolution
//! - 1.0.0: Initial implementation for handler dispatch

use serenity::builder::CreateApplicationCommand;
use serenity::model::permissions::Permissions;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::definition::{Command, CommandKind, Handler};

/// A tree node addressable by name and aliases
pub trait Named {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[String];

    fn keys(&self) -> Vec<&str> {
        std::iter::once(self.name())
            .chain(self.aliases().iter().map(String::as_str))
            .collect()
    }
}

/// One level of the tree: name and alias lookup, registration order kept
pub struct CommandMap<T> {
    entries: Vec<Arc<T>>,
    index: HashMap<String, usize>,
}

impl<T: Named> CommandMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// # Panics
    ///
    /// On an empty name or alias, or one that is already taken at this level.
    /// Collisions are programming errors and must surface before serving traffic.
    pub fn insert(&mut self, node: T) {
        if node.name().trim().is_empty() {
            panic!("cannot register a command with an empty name");
        }
        let keys: Vec<String> = node.keys().iter().map(|k| k.to_lowercase()).collect();
        for (i, key) in keys.iter().enumerate() {
            if key.trim().is_empty() {
                panic!("command '{}' has an empty alias", node.name());
            }
            if self.index.contains_key(key) || keys[..i].contains(key) {
                panic!(
                    "command '{}': '{}' is already registered at this level",
                    node.name(),
                    key
                );
            }
        }

        let slot = self.entries.len();
        self.entries.push(Arc::new(node));
        for key in keys {
            self.index.insert(key, slot);
        }
    }

    /// Look up by name or alias, case-insensitively
    pub fn get(&self, key: &str) -> Option<&Arc<T>> {
        self.index
            .get(&key.to_lowercase())
            .and_then(|slot| self.entries.get(*slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Named> Default for CommandMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CommandMap<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            index: self.index.clone(),
        }
    }
}

impl<T: Named> fmt::Debug for CommandMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.name()))
            .finish()
    }
}

/// A resolved, invocable node
#[derive(Debug, Clone)]
pub struct Route {
    /// Canonical `/`-joined path
    pub path: String,
    pub kind: CommandKind,
    pub handler: Handler,
    /// Union of the permissions declared along the path
    pub permissions: Permissions,
    /// The command-level part, which Discord enforces for slash invocations
    pub exported: Permissions,
    /// Number of tree levels, i.e. tokens consumed on the legacy path
    pub depth: usize,
}

impl Route {
    /// Permissions a slash invocation must still be checked for
    pub fn unenforced(&self) -> Permissions {
        self.permissions - self.exported
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: CommandMap<Command>,
    routes: HashMap<String, Arc<Route>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level command and index every node below it
    ///
    /// # Panics
    ///
    /// On an empty name or a name/alias collision with an existing command.
    pub fn add_command(&mut self, command: Command) {
        self.commands.insert(command);
        let Some(command) = self.commands.iter().last().cloned() else {
            return;
        };

        let base = command.permissions.unwrap_or_else(Permissions::empty);
        let root = command.name.to_lowercase();
        self.add_route(&root, command.kind, &command.handler, base, base, 1);

        for group in command.groups.iter() {
            let group_path = format!("{root}/{}", group.name.to_lowercase());
            let group_perms = base | group.permissions.unwrap_or_else(Permissions::empty);
            self.add_route(&group_path, command.kind, &group.handler, group_perms, base, 2);
            for sub in group.subcommands.iter() {
                let path = format!("{group_path}/{}", sub.name.to_lowercase());
                let perms = group_perms | sub.permissions.unwrap_or_else(Permissions::empty);
                self.add_route(&path, command.kind, &sub.handler, perms, base, 3);
            }
        }
        for sub in command.subcommands.iter() {
            let path = format!("{root}/{}", sub.name.to_lowercase());
            let perms = base | sub.permissions.unwrap_or_else(Permissions::empty);
            self.add_route(&path, command.kind, &sub.handler, perms, base, 2);
        }
    }

    fn add_route(
        &mut self,
        path: &str,
        kind: CommandKind,
        handler: &Handler,
        permissions: Permissions,
        exported: Permissions,
        depth: usize,
    ) {
        let route = Route {
            path: path.to_string(),
            kind,
            handler: handler.clone(),
            permissions,
            exported,
            depth,
        };
        self.routes.insert(path.to_string(), Arc::new(route));
    }

    pub fn commands(&self) -> &CommandMap<Command> {
        &self.commands
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Command>> {
        self.commands.get(name)
    }

    /// Every route path, in registration order of their commands
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        let order = |path: &str| {
            let root = path.split('/').next().unwrap_or_default();
            self.commands
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(root))
                .unwrap_or(usize::MAX)
        };
        paths.sort_by(|a, b| order(a).cmp(&order(b)).then_with(|| a.cmp(b)));
        paths
    }

    /// Resolve a structured interaction by its command name and subcommand path
    pub fn resolve_interaction(&self, name: &str, path: &[String]) -> Option<Arc<Route>> {
        let mut key = name.to_lowercase();
        for segment in path {
            key.push('/');
            key.push_str(&segment.to_lowercase());
        }
        self.routes.get(&key).cloned()
    }

    /// Greedily resolve whitespace-separated legacy tokens
    ///
    /// Descends while tokens match a child. When a token does not match, the
    /// deepest node seen so far that has its own executor is returned instead.
    /// Returns the route and the number of tokens consumed.
    pub fn resolve_tokens(&self, tokens: &[&str]) -> Option<(Arc<Route>, usize)> {
        let first = tokens.first()?;
        let command = self.commands.get(first)?;

        let mut path = command.name.to_lowercase();
        let mut fallback = self.runnable(&path);
        if !command.has_children() {
            return self.routes.get(&path).map(|r| (Arc::clone(r), 1));
        }

        let Some(second) = tokens.get(1) else {
            return fallback;
        };
        if let Some(sub) = command.subcommands.get(second) {
            path = format!("{path}/{}", sub.name.to_lowercase());
            return self.routes.get(&path).map(|r| (Arc::clone(r), 2));
        }
        let Some(group) = command.groups.get(second) else {
            return fallback;
        };

        path = format!("{path}/{}", group.name.to_lowercase());
        if let Some(found) = self.runnable(&path) {
            fallback = Some(found);
        }
        if group.subcommands.is_empty() {
            return self.routes.get(&path).map(|r| (Arc::clone(r), 2));
        }
        match tokens.get(2).and_then(|t| group.subcommands.get(t)) {
            Some(sub) => {
                path = format!("{path}/{}", sub.name.to_lowercase());
                self.routes.get(&path).map(|r| (Arc::clone(r), 3))
            }
            None => fallback,
        }
    }

    fn runnable(&self, path: &str) -> Option<(Arc<Route>, usize)> {
        self.routes
            .get(path)
            .filter(|r| r.handler.is_runnable())
            .map(|r| (Arc::clone(r), r.depth))
    }

    /// Export the tree in the platform's registration shape
    pub fn create_data(&self) -> Vec<CreateApplicationCommand> {
        self.commands.iter().map(|c| c.create_data()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
