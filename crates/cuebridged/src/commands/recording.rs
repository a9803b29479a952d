//! Recording and replay buffer control.

use serde_json::json;

use crate::dispatch::{CommandContext, Request};
use crate::studio::Studio;

use super::{CommandResult, Params, done, fields};

pub(super) fn start_stop_recording(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::toggle_recording);
    done()
}

pub(super) fn start_recording(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::start_recording)?;
    done()
}

pub(super) fn stop_recording(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::stop_recording)?;
    done()
}

pub(super) fn pause_recording(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::pause_recording)?;
    done()
}

pub(super) fn resume_recording(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::resume_recording)?;
    done()
}

pub(super) fn get_recording_status(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        let mut status = fields(json!({
            "isRecording": studio.recording.active,
            "isRecordingPaused": studio.recording.paused,
        }));
        if let Some(filename) = &studio.recording.filename {
            status.insert(String::from("recordingFilename"), json!(filename));
        }
        Ok(status)
    })
}

pub(super) fn set_recording_folder(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let folder = Params::new(request).str("rec-folder")?;
    context
        .studio
        .with_studio(|studio| studio.set_recording_folder(folder))?;
    done()
}

pub(super) fn get_recording_folder(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    let folder = context
        .studio
        .with_studio(|studio| studio.recording_folder.clone());
    Ok(fields(json!({ "rec-folder": folder })))
}

pub(super) fn get_replay_buffer_status(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    let active = context.studio.with_studio(|studio| studio.replay_buffer);
    Ok(fields(json!({ "isReplayBufferActive": active })))
}

pub(super) fn start_stop_replay_buffer(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    context.studio.with_studio(Studio::toggle_replay_buffer);
    done()
}

pub(super) fn start_replay_buffer(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::start_replay_buffer)?;
    done()
}

pub(super) fn stop_replay_buffer(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::stop_replay_buffer)?;
    done()
}

pub(super) fn save_replay_buffer(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(Studio::save_replay_buffer)?;
    done()
}
