//! Scene transition selection and duration.

use serde_json::{Value, json};

use crate::dispatch::{CommandContext, Request};

use super::{CommandResult, Params, done, fields};

pub(super) fn get_transition_list(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        let transitions: Vec<Value> = studio
            .transitions
            .iter()
            .map(|transition| json!({ "name": transition.name }))
            .collect();
        Ok(fields(json!({
            "current-transition": studio.current_transition,
            "transitions": transitions,
        })))
    })
}

/// Fixed transitions (such as a cut) report no duration.
pub(super) fn get_current_transition(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    context.studio.with_studio(|studio| {
        let transition = studio.transition(&studio.current_transition)?;
        let mut reply = fields(json!({ "name": transition.name }));
        if !transition.fixed {
            reply.insert(
                String::from("duration"),
                json!(studio.transition_duration_ms),
            );
        }
        Ok(reply)
    })
}

pub(super) fn set_current_transition(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let name = Params::new(request).str("transition-name")?;
    context
        .studio
        .with_studio(|studio| studio.set_current_transition(name))?;
    done()
}

pub(super) fn set_transition_duration(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let duration = Params::new(request).u64("duration")?;
    context
        .studio
        .with_studio(|studio| studio.transition_duration_ms = duration);
    done()
}

pub(super) fn get_transition_duration(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    let duration = context
        .studio
        .with_studio(|studio| studio.transition_duration_ms);
    Ok(fields(json!({ "transition-duration": duration })))
}

/// Transitions complete instantly in the in-memory studio.
pub(super) fn get_transition_position(
    _context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    Ok(fields(json!({ "position": 0.0 })))
}
