//! Command registry keyed by name and alias.
//!
//! Every name and alias is stored lower-cased and must be unique across the
//! registry. Registration validates a descriptor completely before touching
//! the index, so a rejected descriptor leaves the registry unchanged.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::command::{Category, Command};

/// A named command and its metadata.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    aliases: Vec<String>,
    description: String,
    category: Category,
    handler: Arc<dyn Command>,
}

impl CommandDescriptor {
    /// Creates a descriptor with no aliases.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        handler: Arc<dyn Command>,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            category,
            handler,
        }
    }

    /// Adds alternative names.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// One-line description for help listings.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Help listing group.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Behaviour to run.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Command> {
        &self.handler
    }

    fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Errors raised while registering commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A name or alias is already claimed by another command.
    #[error("'{token}' is already registered by command '{existing}'")]
    Conflict {
        /// Contested name or alias.
        token: String,
        /// Command that owns it.
        existing: String,
    },
    /// A name or alias is empty or contains whitespace.
    #[error("invalid command name '{name}'")]
    InvalidName {
        /// Offending name.
        name: String,
    },
}

/// Registry of available commands.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    descriptors: Vec<CommandDescriptor>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command under its name and aliases.
    ///
    /// Aliases repeating the command's own name are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] for empty or whitespace-bearing
    /// tokens and [`RegistryError::Conflict`] when a token is already taken.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        let mut tokens: Vec<String> = Vec::new();
        for token in descriptor.tokens() {
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                return Err(RegistryError::InvalidName {
                    name: token.to_owned(),
                });
            }
            let key = token.to_lowercase();
            if let Some(&position) = self.index.get(&key) {
                let existing = self
                    .descriptors
                    .get(position)
                    .map_or_else(String::new, |d| d.name.clone());
                return Err(RegistryError::Conflict {
                    token: token.to_owned(),
                    existing,
                });
            }
            if !tokens.contains(&key) {
                tokens.push(key);
            }
        }

        let position = self.descriptors.len();
        for key in tokens {
            self.index.insert(key, position);
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Looks up a command by name or alias, ignoring case.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&CommandDescriptor> {
        self.index
            .get(&token.to_lowercase())
            .and_then(|&position| self.descriptors.get(position))
    }

    /// Every command once, in registration order.
    #[must_use]
    pub fn list(&self) -> &[CommandDescriptor] {
        &self.descriptors
    }

    /// Commands grouped by category.
    ///
    /// Groups appear in the order their first command was registered.
    #[must_use]
    pub fn by_category(&self) -> Vec<(Category, Vec<&CommandDescriptor>)> {
        let mut groups: Vec<(Category, Vec<&CommandDescriptor>)> = Vec::new();
        for descriptor in &self.descriptors {
            match groups
                .iter_mut()
                .find(|(category, _)| *category == descriptor.category)
            {
                Some((_, members)) => members.push(descriptor),
                None => groups.push((descriptor.category, vec![descriptor])),
            }
        }
        groups
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` when no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
