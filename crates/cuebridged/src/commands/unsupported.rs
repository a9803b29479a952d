//! Commands that need facilities the in-memory studio cannot provide.
//!
//! They stay registered so clients can tell them apart from unknown names.

use crate::dispatch::{CommandContext, Request};

use super::{CommandError, CommandResult};

pub(super) fn unsupported(_context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    Err(CommandError::Unsupported {
        command: request.command().to_owned(),
    })
}
