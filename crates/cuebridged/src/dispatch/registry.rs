//! Immutable command-name to handler table.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use super::command::CommandHandler;
use super::errors::RegistryError;

/// Capability switches consulted while the registry is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Registers `SendCaptions`.
    pub captions: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            captions: cfg!(feature = "captions"),
        }
    }
}

/// Read-only mapping from command name to handler.
///
/// Aliases share the target's handler value, so resolving either name
/// yields the same `Arc`.
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Starts an empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up the handler bound to `name` (exact, case-sensitive).
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of bound names, aliases included.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// All bound names in lexical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

/// Collects handlers and aliases before freezing them into a registry.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl RegistryBuilder {
    /// Binds `name` to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] if `name` is already bound.
    pub fn register<H>(&mut self, name: &str, handler: H) -> Result<&mut Self, RegistryError>
    where
        H: CommandHandler + 'static,
    {
        self.register_shared(name, Arc::new(handler))
    }

    /// Binds `name` to an already shared handler.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] if `name` is already bound.
    pub fn register_shared(
        &mut self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<&mut Self, RegistryError> {
        match self.handlers.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateCommand {
                name: name.to_owned(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(self)
            }
        }
    }

    /// Binds `alias` to the handler already registered under `target`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownAliasTarget`] when `target` is not yet
    /// registered and [`RegistryError::DuplicateCommand`] when `alias` is.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<&mut Self, RegistryError> {
        let handler = self.handlers.get(target).map(Arc::clone).ok_or_else(|| {
            RegistryError::UnknownAliasTarget {
                alias: alias.to_owned(),
                target: target.to_owned(),
            }
        })?;
        self.register_shared(alias, handler)
    }

    /// Freezes the table.
    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            handlers: self.handlers,
        }
    }
}
