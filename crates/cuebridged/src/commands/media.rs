//! Media source playback.

use serde_json::{Value, json};

use crate::dispatch::{CommandContext, Request};
use crate::studio::MediaPlayback;

use super::{CommandError, CommandResult, Params, done, fields};

/// Applies `action` to the playback state of the named media source.
fn with_media<R>(
    context: &mut CommandContext<'_>,
    request: &Request,
    action: impl FnOnce(&mut MediaPlayback) -> R,
) -> Result<R, CommandError> {
    let name = Params::new(request).str("sourceName")?;
    let outcome = context
        .studio
        .with_studio(|studio| studio.media_mut(name).map(action))?;
    Ok(outcome)
}

pub(super) fn play_pause_media(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let pause = Params::new(request).bool("playPause")?;
    with_media(context, request, |media| media.play_pause(pause))?;
    done()
}

pub(super) fn restart_media(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    with_media(context, request, MediaPlayback::restart)?;
    done()
}

pub(super) fn stop_media(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    with_media(context, request, MediaPlayback::stop)?;
    done()
}

pub(super) fn next_media(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    with_media(context, request, MediaPlayback::next)?;
    done()
}

pub(super) fn previous_media(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    with_media(context, request, MediaPlayback::previous)?;
    done()
}

pub(super) fn get_media_duration(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let duration = with_media(context, request, |media| media.duration_ms)?;
    Ok(fields(json!({ "mediaDuration": duration })))
}

pub(super) fn get_media_time(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let time = with_media(context, request, |media| media.time_ms)?;
    Ok(fields(json!({ "timestamp": time })))
}

pub(super) fn set_media_time(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let timestamp = Params::new(request).i64("timestamp")?;
    with_media(context, request, |media| media.seek(timestamp))?;
    done()
}

/// Moves the cursor by `timeOffset` milliseconds, clamped to the media.
pub(super) fn scrub_media(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let offset = Params::new(request).i64("timeOffset")?;
    with_media(context, request, |media| {
        media.seek(media.time_ms.saturating_add(offset));
    })?;
    done()
}

pub(super) fn get_media_state(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let state = with_media(context, request, |media| media.state)?;
    Ok(fields(json!({ "mediaState": state.as_str() })))
}

pub(super) fn get_media_sources_list(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    context.studio.with_studio(|studio| {
        let sources: Vec<Value> = studio
            .sources
            .iter()
            .filter_map(|source| {
                source.media.as_ref().map(|media| {
                    json!({
                        "sourceName": source.name,
                        "sourceKind": source.type_id,
                        "mediaState": media.state.as_str(),
                    })
                })
            })
            .collect();
        Ok(fields(json!({ "mediaSources": sources })))
    })
}
