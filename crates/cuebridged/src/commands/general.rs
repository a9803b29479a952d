//! Session handshake and global studio settings.

use serde_json::json;
use tracing::info;

use crate::dispatch::{CommandContext, Request};
use crate::studio::STUDIO_VERSION;

use super::{COMMANDS_TARGET, CommandError, CommandResult, Params, done, fields};

/// Protocol version advertised to clients.
pub const PROTOCOL_VERSION: f64 = 1.1;

pub(super) fn get_version(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    Ok(fields(json!({
        "version": PROTOCOL_VERSION,
        "gateway-version": env!("CARGO_PKG_VERSION"),
        "studio-version": STUDIO_VERSION,
        "available-requests": context.registry.names().join(","),
    })))
}

pub(super) fn get_auth_required(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    Ok(fields(json!({
        "authRequired": context.policy.authentication_required(),
    })))
}

pub(super) fn authenticate(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    if context.connection.is_authenticated() {
        return Err(CommandError::Rejected("already authenticated"));
    }
    let offered = Params::new(request).str("auth")?;
    if offered.is_empty() {
        return Err(CommandError::Rejected("auth not specified!"));
    }
    if !context.authenticator.verify(offered) {
        return Err(CommandError::Rejected("Authentication Failed."));
    }
    context.connection.mark_authenticated();
    info!(
        target: COMMANDS_TARGET,
        connection = context.connection.id(),
        "connection authenticated"
    );
    done()
}

pub(super) fn set_heartbeat(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let enable = Params::new(request).bool("enable")?;
    context.connection.set_heartbeat(enable);
    done()
}

pub(super) fn get_stats(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    let fps = context.studio.with_studio(|studio| studio.video.fps());
    Ok(fields(json!({
        "stats": {
            "fps": fps,
            "render-total-frames": 0,
            "render-missed-frames": 0,
            "output-total-frames": 0,
            "output-skipped-frames": 0,
            "average-frame-time": 0.0,
            "cpu-usage": 0.0,
            "memory-usage": 0.0,
            "free-disk-space": 0.0,
        }
    })))
}

pub(super) fn get_video_info(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        let video = &studio.video;
        Ok(fields(json!({
            "baseWidth": video.base_width,
            "baseHeight": video.base_height,
            "outputWidth": video.output_width,
            "outputHeight": video.output_height,
            "scaleType": video.scale_type,
            "fps": video.fps(),
            "videoFormat": video.video_format,
            "colorSpace": video.color_space,
            "colorRange": video.color_range,
        })))
    })
}

pub(super) fn set_filename_formatting(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let formatting = Params::new(request).str("filename-formatting")?;
    if formatting.trim().is_empty() {
        return Err(CommandError::invalid(
            "filename-formatting",
            "must not be empty",
        ));
    }
    context
        .studio
        .with_studio(|studio| formatting.clone_into(&mut studio.filename_formatting));
    done()
}

pub(super) fn get_filename_formatting(
    context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    let formatting = context
        .studio
        .with_studio(|studio| studio.filename_formatting.clone());
    Ok(fields(json!({ "filename-formatting": formatting })))
}
