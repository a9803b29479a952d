//! Streaming control, stream settings and captions.

use serde_json::json;

use crate::dispatch::{CommandContext, Request};
use crate::studio::{StreamSettings, Studio, merge};

use super::{CommandResult, Params, done, fields};

fn virtualcam_active(studio: &Studio) -> bool {
    studio.output("virtualcam_output").is_ok_and(|output| output.active)
}

pub(super) fn get_streaming_status(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        Ok(fields(json!({
            "streaming": studio.streaming,
            "recording": studio.recording.active,
            "recording-paused": studio.recording.paused,
            "replay-buffer-active": studio.replay_buffer,
            "virtualcam": virtualcam_active(studio),
            "preview-only": false,
        })))
    })
}

pub(super) fn start_stop_streaming(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::toggle_streaming);
    done()
}

/// Starts streaming, optionally applying a one-off `stream` override first.
pub(super) fn start_streaming(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let stream = params.opt_object("stream")?;
    context.studio.with_studio(|studio| {
        if let Some(stream) = stream.filter(|_| !studio.streaming) {
            if let Some(kind) = stream.get("type").and_then(|value| value.as_str()) {
                kind.clone_into(&mut studio.stream_settings.kind);
            }
            if let Some(settings) = stream.get("settings").and_then(|value| value.as_object()) {
                merge(&mut studio.stream_settings.settings, settings);
            }
        }
        studio.start_streaming()?;
        done()
    })
}

pub(super) fn stop_streaming(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::stop_streaming)?;
    done()
}

pub(super) fn set_stream_settings(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let kind = params.str("type")?;
    let settings = params.object("settings")?;
    let save = params.bool("save")?;
    context.studio.with_studio(|studio| {
        let mut updated = studio.stream_settings.settings.clone();
        merge(&mut updated, settings);
        studio.stream_settings = StreamSettings {
            kind: kind.to_owned(),
            settings: updated,
        };
        if save {
            studio.save_stream_settings();
        }
        Ok(fields(json!({
            "type": studio.stream_settings.kind,
            "settings": studio.stream_settings.settings,
        })))
    })
}

pub(super) fn get_stream_settings(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        Ok(fields(json!({
            "type": studio.stream_settings.kind,
            "settings": studio.stream_settings.settings,
        })))
    })
}

pub(super) fn save_stream_settings(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::save_stream_settings);
    done()
}

pub(super) fn send_captions(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let text = Params::new(request).str("text")?;
    context.studio.with_studio(|studio| studio.send_caption(text))?;
    done()
}
