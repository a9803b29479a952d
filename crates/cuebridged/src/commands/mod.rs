//! Command handlers operating on the in-memory studio.
//!
//! Handlers compute a [`CommandResult`] and are wrapped by
//! [`build_registry`] so that every outcome becomes exactly one
//! [`Response`]. The dispatcher never sees a [`CommandError`]; it only
//! forwards the response a handler produced.

mod collections;
mod errors;
mod filters;
mod general;
mod media;
mod outputs;
mod params;
mod recording;
mod scene_items;
mod scenes;
mod sources;
mod streaming;
mod studio_mode;
mod table;
mod transitions;
mod unsupported;

#[cfg(test)]
mod test_support;

use serde_json::Value;
use tracing::debug;

use crate::dispatch::{
    CommandContext, CommandHandler, CommandRegistry, Fields, RegistryError, RegistryOptions,
    Request, Response,
};

pub use self::errors::CommandError;
pub(crate) use self::params::Params;

const COMMANDS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// Outcome of a command before it is wrapped into a response.
pub type CommandResult = Result<Fields, CommandError>;

/// Signature shared by every handler in the command table.
pub type ReplyFn = fn(&mut CommandContext<'_>, &Request) -> CommandResult;

/// Converts a handler outcome into the response for `request`.
pub fn respond(request: &Request, result: CommandResult) -> Response {
    match result {
        Ok(fields) => Response::success(request.token(), fields),
        Err(error) => {
            debug!(
                target: COMMANDS_TARGET,
                command = request.command(),
                %error,
                "command failed"
            );
            Response::failure(request.token(), error.to_string())
        }
    }
}

/// Adapts a [`ReplyFn`] to the dispatcher's handler seam.
#[derive(Clone, Copy)]
struct Reply(ReplyFn);

impl CommandHandler for Reply {
    fn handle(&self, context: &mut CommandContext<'_>, request: &Request) -> Response {
        respond(request, (self.0)(context, request))
    }
}

/// Builds the registry holding every command this gateway serves.
///
/// # Errors
///
/// Returns [`RegistryError`] when the command table binds a name twice or
/// aliases an unbound name.
pub fn build_registry(options: RegistryOptions) -> Result<CommandRegistry, RegistryError> {
    let mut builder = CommandRegistry::builder();
    for (name, reply) in table::COMMANDS {
        builder.register(name, Reply(*reply))?;
    }
    if options.captions {
        for (name, reply) in table::CAPTION_COMMANDS {
            builder.register(name, Reply(*reply))?;
        }
    }
    for (alias, target) in table::ALIASES {
        builder.alias(alias, target)?;
    }
    let registry = builder.build();
    debug!(
        target: COMMANDS_TARGET,
        commands = registry.len(),
        captions = options.captions,
        "built command registry"
    );
    Ok(registry)
}

/// Converts a `json!` object literal into response fields.
fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn done() -> CommandResult {
    Ok(Fields::new())
}
