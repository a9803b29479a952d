//! Commands callable before a connection authenticates.

use std::collections::HashSet;

use super::errors::ExemptSetError;
use super::registry::CommandRegistry;

/// Commands every gateway leaves open so clients can discover and complete
/// the authentication handshake.
pub const STANDARD_EXEMPT_COMMANDS: [&str; 3] = ["GetVersion", "GetAuthRequired", "Authenticate"];

/// Immutable set of auth-exempt command names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthExemptSet {
    names: HashSet<String>,
}

impl AuthExemptSet {
    /// Builds a set, checking each name against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ExemptSetError::UnregisteredCommand`] for the first name
    /// with no registered handler.
    pub fn new<I, S>(names: I, registry: &CommandRegistry) -> Result<Self, ExemptSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = HashSet::new();
        for name in names {
            let name = name.into();
            if !registry.contains(&name) {
                return Err(ExemptSetError::UnregisteredCommand { name });
            }
            set.insert(name);
        }
        Ok(Self { names: set })
    }

    /// Builds the set of [`STANDARD_EXEMPT_COMMANDS`].
    ///
    /// # Errors
    ///
    /// Fails when `registry` lacks any of the standard commands.
    pub fn standard(registry: &CommandRegistry) -> Result<Self, ExemptSetError> {
        Self::new(STANDARD_EXEMPT_COMMANDS, registry)
    }

    /// Whether `name` may run without authentication (exact match).
    pub fn is_exempt(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
