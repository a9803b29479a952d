//! Studio mode: a preview scene staged before going to program.

use serde_json::json;

use crate::dispatch::{CommandContext, Request};

use super::scenes::scene_json;
use super::{CommandError, CommandResult, Params, done, fields};

pub(super) fn get_studio_mode_status(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    let enabled = context.studio.with_studio(|studio| studio.studio_mode);
    Ok(fields(json!({ "studio-mode": enabled })))
}

pub(super) fn get_preview_scene(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        let scene = studio.preview_scene()?;
        Ok(fields(scene_json(studio, scene)))
    })
}

pub(super) fn set_preview_scene(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("scene-name")?;
    context
        .studio
        .with_studio(|studio| studio.set_preview_scene(name))?;
    done()
}

/// Puts the preview on program, optionally with `with-transition`
/// `{"name", "duration"}` selected first.
pub(super) fn transition_to_program(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let transition = match Params::new(request).opt_object("with-transition")? {
        Some(requested) => {
            let name = requested
                .get("name")
                .and_then(|value| value.as_str())
                .ok_or_else(|| CommandError::missing("with-transition.name"))?;
            let duration = match requested.get("duration") {
                None => None,
                Some(value) => Some(value.as_u64().ok_or_else(|| {
                    CommandError::invalid("with-transition.duration", "expected a non-negative integer")
                })?),
            };
            Some((name, duration))
        }
        None => None,
    };
    context
        .studio
        .with_studio(|studio| studio.transition_to_program(transition))?;
    done()
}

pub(super) fn enable_studio_mode(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| studio.set_studio_mode(true));
    done()
}

pub(super) fn disable_studio_mode(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| studio.set_studio_mode(false));
    done()
}

pub(super) fn toggle_studio_mode(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context
        .studio
        .with_studio(|studio| studio.set_studio_mode(!studio.studio_mode));
    done()
}
