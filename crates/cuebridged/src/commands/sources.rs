//! Source audio, naming, settings and typed property commands.

use serde_json::{Value, json};

use crate::dispatch::{CommandContext, Request};
use crate::studio::{
    BROWSER_TYPES, MonitorType, Settings, TEXT_FREETYPE2_TYPES, TEXT_GDIPLUS_TYPES, merge,
};

use super::{CommandError, CommandResult, Params, done, fields};

/// Floor reported for silence when volumes are requested in decibels.
const MIN_DECIBELS: f64 = -100.0;

/// Input kinds the studio knows how to create: type id, display name, caps.
const SOURCE_TYPES: &[(&str, &str, SourceCaps)] = &[
    ("v4l2_input", "Video Capture Device", SourceCaps::VIDEO_ASYNC),
    ("pulse_output_capture", "Audio Output Capture", SourceCaps::AUDIO),
    ("pulse_input_capture", "Audio Input Capture", SourceCaps::AUDIO),
    ("ffmpeg_source", "Media Source", SourceCaps::MEDIA),
    ("image_source", "Image", SourceCaps::VIDEO),
    ("color_source", "Color Source", SourceCaps::VIDEO),
    ("text_ft2_source", "Text (FreeType 2)", SourceCaps::VIDEO),
    ("text_gdiplus", "Text (GDI+)", SourceCaps::VIDEO),
    ("browser_source", "Browser", SourceCaps::INTERACTIVE),
];

#[derive(Debug, Clone, Copy)]
struct SourceCaps {
    is_async: bool,
    has_video: bool,
    has_audio: bool,
    can_interact: bool,
}

impl SourceCaps {
    const VIDEO: Self = Self {
        is_async: false,
        has_video: true,
        has_audio: false,
        can_interact: false,
    };
    const VIDEO_ASYNC: Self = Self {
        is_async: true,
        ..Self::VIDEO
    };
    const AUDIO: Self = Self {
        is_async: true,
        has_video: false,
        has_audio: true,
        can_interact: false,
    };
    const MEDIA: Self = Self {
        is_async: true,
        has_video: true,
        has_audio: true,
        can_interact: false,
    };
    const INTERACTIVE: Self = Self {
        is_async: false,
        has_video: true,
        has_audio: true,
        can_interact: true,
    };
}

fn decibels(multiplier: f64) -> f64 {
    if multiplier <= 0.0 {
        MIN_DECIBELS
    } else {
        (20.0 * multiplier.log10()).max(MIN_DECIBELS)
    }
}

pub(super) fn set_volume(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("source")?;
    let volume = params.f64("volume")?;
    let decibel = params.opt_bool("useDecibel")?.unwrap_or(false);
    let multiplier = if decibel {
        if volume > 0.0 {
            return Err(CommandError::invalid("volume", "decibels must not exceed 0.0"));
        }
        10_f64.powf(volume / 20.0)
    } else {
        if !(0.0..=1.0).contains(&volume) {
            return Err(CommandError::invalid("volume", "expected a value in 0.0..=1.0"));
        }
        volume
    };
    context
        .studio
        .with_studio(|studio| studio.source_mut(name).map(|source| source.volume = multiplier))?;
    done()
}

pub(super) fn get_volume(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("source")?;
    let decibel = params.opt_bool("useDecibel")?.unwrap_or(false);
    context.studio.with_studio(|studio| {
        let source = studio.source(name)?;
        let volume = if decibel {
            decibels(source.volume)
        } else {
            source.volume
        };
        Ok(fields(json!({
            "name": source.name,
            "volume": volume,
            "muted": source.muted,
        })))
    })
}

pub(super) fn toggle_mute(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("source")?;
    context
        .studio
        .with_studio(|studio| studio.source_mut(name).map(|source| source.muted = !source.muted))?;
    done()
}

pub(super) fn set_mute(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("source")?;
    let mute = params.bool("mute")?;
    context
        .studio
        .with_studio(|studio| studio.source_mut(name).map(|source| source.muted = mute))?;
    done()
}

pub(super) fn get_mute(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("source")?;
    context.studio.with_studio(|studio| {
        let source = studio.source(name)?;
        Ok(fields(json!({ "name": source.name, "muted": source.muted })))
    })
}

pub(super) fn get_audio_active(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("sourceName")?;
    let active = context
        .studio
        .with_studio(|studio| studio.source(name).map(|source| source.audio_active()))?;
    Ok(fields(json!({ "audioActive": active })))
}

pub(super) fn set_source_name(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("sourceName")?;
    let new_name = params.str("newName")?;
    context
        .studio
        .with_studio(|studio| studio.rename_source(name, new_name))?;
    done()
}

pub(super) fn set_sync_offset(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("source")?;
    let offset = params.i64("offset")?;
    context.studio.with_studio(|studio| {
        studio
            .source_mut(name)
            .map(|source| source.sync_offset_ns = offset)
    })?;
    done()
}

pub(super) fn get_sync_offset(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let name = Params::new(request).str("source")?;
    context.studio.with_studio(|studio| {
        let source = studio.source(name)?;
        Ok(fields(json!({ "name": source.name, "offset": source.sync_offset_ns })))
    })
}

pub(super) fn get_special_sources(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        Ok(studio
            .special_sources
            .iter()
            .map(|(channel, source)| (channel.clone(), json!(source)))
            .collect())
    })
}

pub(super) fn get_sources_list(context: &mut CommandContext<'_>, _request: &Request) -> CommandResult {
    context.studio.with_studio(|studio| {
        let sources: Vec<Value> = studio
            .sources
            .iter()
            .map(|source| {
                json!({
                    "name": source.name,
                    "typeId": source.type_id,
                    "type": "input",
                })
            })
            .collect();
        Ok(fields(json!({ "sources": sources })))
    })
}

pub(super) fn get_source_types_list(
    _context: &mut CommandContext<'_>,
    _request: &Request,
) -> CommandResult {
    let types: Vec<Value> = SOURCE_TYPES
        .iter()
        .map(|(type_id, display_name, caps)| {
            json!({
                "typeId": type_id,
                "displayName": display_name,
                "type": "input",
                "defaultSettings": {},
                "caps": {
                    "isAsync": caps.is_async,
                    "hasVideo": caps.has_video,
                    "hasAudio": caps.has_audio,
                    "canInteract": caps.can_interact,
                    "isComposite": false,
                    "doNotDuplicate": false,
                    "doNotSelfMonitor": false,
                },
            })
        })
        .collect();
    Ok(fields(json!({ "types": types })))
}

/// Fails when the caller names a `sourceType` other than the source's own.
fn check_type(name: &str, actual: &str, expected: Option<&str>) -> Result<(), CommandError> {
    match expected {
        Some(expected) if expected != actual => Err(CommandError::invalid(
            "sourceType",
            format!("source '{name}' is of type '{actual}'"),
        )),
        _ => Ok(()),
    }
}

pub(super) fn get_source_settings(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("sourceName")?;
    let expected = params.opt_str("sourceType")?;
    context.studio.with_studio(|studio| {
        let source = studio.source(name)?;
        check_type(name, &source.type_id, expected)?;
        Ok(fields(json!({
            "sourceName": source.name,
            "sourceType": source.type_id,
            "sourceSettings": source.settings,
        })))
    })
}

pub(super) fn set_source_settings(context: &mut CommandContext<'_>, request: &Request) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("sourceName")?;
    let settings = params.object("sourceSettings")?;
    let expected = params.opt_str("sourceType")?;
    context.studio.with_studio(|studio| {
        let source = studio.source_mut(name)?;
        check_type(name, &source.type_id, expected)?;
        merge(&mut source.settings, settings);
        Ok(fields(json!({
            "sourceName": source.name,
            "sourceType": source.type_id,
            "sourceSettings": source.settings,
        })))
    })
}

pub(super) fn get_audio_monitor_type(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let name = Params::new(request).str("sourceName")?;
    let monitor = context
        .studio
        .with_studio(|studio| studio.source(name).map(|source| source.monitor_type))?;
    Ok(fields(json!({ "monitorType": monitor.as_str() })))
}

pub(super) fn set_audio_monitor_type(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("sourceName")?;
    let monitor: MonitorType = params
        .str("monitorType")?
        .parse()
        .map_err(|reason: String| CommandError::invalid("monitorType", reason))?;
    context
        .studio
        .with_studio(|studio| studio.source_mut(name).map(|source| source.monitor_type = monitor))?;
    done()
}

/// Reads the settings of a source restricted to `types`, flattened beside
/// the source name.
fn typed_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
    types: &[&str],
    expected: &'static str,
) -> CommandResult {
    let name = Params::new(request).str("source")?;
    context.studio.with_studio(|studio| {
        let source = studio.typed_source_mut(name, types, expected)?;
        let mut reply: Settings = source.settings.clone();
        reply.insert(String::from("source"), json!(source.name));
        Ok(reply)
    })
}

/// Merges every request parameter except `source` into a typed source.
fn set_typed_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
    types: &[&str],
    expected: &'static str,
) -> CommandResult {
    let params = Params::new(request);
    let name = params.str("source")?;
    let update = params.rest(&["source"]);
    context.studio.with_studio(|studio| {
        let source = studio.typed_source_mut(name, types, expected)?;
        merge(&mut source.settings, &update);
        done()
    })
}

pub(super) fn get_text_gdi_plus_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    typed_properties(context, request, TEXT_GDIPLUS_TYPES, "text GDI+")
}

pub(super) fn set_text_gdi_plus_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    set_typed_properties(context, request, TEXT_GDIPLUS_TYPES, "text GDI+")
}

pub(super) fn get_text_freetype2_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    typed_properties(context, request, TEXT_FREETYPE2_TYPES, "text FreeType 2")
}

pub(super) fn set_text_freetype2_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    set_typed_properties(context, request, TEXT_FREETYPE2_TYPES, "text FreeType 2")
}

pub(super) fn get_browser_source_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    typed_properties(context, request, BROWSER_TYPES, "browser")
}

pub(super) fn set_browser_source_properties(
    context: &mut CommandContext<'_>,
    request: &Request,
) -> CommandResult {
    set_typed_properties(context, request, BROWSER_TYPES, "browser")
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::super::test_support::Session;
    use super::*;

    #[fixture]
    fn session() -> Session {
        Session::new()
    }

    #[rstest]
    #[case(1.0, 0.0)]
    #[case(0.0, MIN_DECIBELS)]
    fn decibel_conversion(#[case] multiplier: f64, #[case] expected: f64) {
        assert!((decibels(multiplier) - expected).abs() < 1e-9);
    }

    #[rstest]
    fn volume_accepts_multipliers_and_decibels(mut session: Session) {
        session.ok("SetVolume", json!({"source": "Mic/Aux", "volume": 0.5}));
        assert_eq!(session.ok("GetVolume", json!({"source": "Mic/Aux"}))["volume"], 0.5);

        session.ok(
            "SetVolume",
            json!({"source": "Mic/Aux", "volume": -20.0, "useDecibel": true}),
        );
        let volume = session.ok("GetVolume", json!({"source": "Mic/Aux"}))["volume"]
            .as_f64()
            .expect("number");
        assert!((volume - 0.1).abs() < 1e-9);

        assert!(
            session
                .err("SetVolume", json!({"source": "Mic/Aux", "volume": 1.5}))
                .starts_with("invalid request parameter 'volume'")
        );
    }

    #[rstest]
    fn mute_toggles_and_audio_activity(mut session: Session) {
        assert_eq!(
            session.ok("GetAudioActive", json!({"sourceName": "Mic/Aux"}))["audioActive"],
            true
        );
        session.ok("ToggleMute", json!({"source": "Mic/Aux"}));
        assert_eq!(session.ok("GetMute", json!({"source": "Mic/Aux"}))["muted"], true);
        assert_eq!(
            session.ok("GetAudioActive", json!({"sourceName": "Mic/Aux"}))["audioActive"],
            false
        );
        session.ok("SetMute", json!({"source": "Mic/Aux", "mute": false}));
        assert_eq!(session.ok("GetMute", json!({"source": "Mic/Aux"}))["muted"], false);
    }

    #[rstest]
    fn renaming_updates_special_sources(mut session: Session) {
        session.ok(
            "SetSourceName",
            json!({"sourceName": "Mic/Aux", "newName": "Host Mic"}),
        );
        assert_eq!(session.ok("GetSpecialSources", json!({}))["mic-1"], "Host Mic");
        assert_eq!(
            session.err(
                "SetSourceName",
                json!({"sourceName": "Host Mic", "newName": "Camera"})
            ),
            "source 'Camera' already exists"
        );
    }

    #[rstest]
    fn sync_offset_and_monitoring(mut session: Session) {
        session.ok("SetSyncOffset", json!({"source": "Camera", "offset": 40_000_000}));
        assert_eq!(
            session.ok("GetSyncOffset", json!({"source": "Camera"}))["offset"],
            40_000_000
        );
        session.ok(
            "SetAudioMonitorType",
            json!({"sourceName": "Mic/Aux", "monitorType": "monitorOnly"}),
        );
        assert_eq!(
            session.ok("GetAudioMonitorType", json!({"sourceName": "Mic/Aux"}))["monitorType"],
            "monitorOnly"
        );
        assert!(
            session
                .err(
                    "SetAudioMonitorType",
                    json!({"sourceName": "Mic/Aux", "monitorType": "loud"})
                )
                .contains("invalid monitor type")
        );
    }

    #[rstest]
    fn settings_merge_and_check_type(mut session: Session) {
        let merged = session.ok(
            "SetSourceSettings",
            json!({"sourceName": "Chat", "sourceSettings": {"css": "body {}"}}),
        );
        assert_eq!(merged["sourceSettings"]["css"], "body {}");
        assert_eq!(merged["sourceSettings"]["width"], 400);
        assert!(
            session
                .err(
                    "GetSourceSettings",
                    json!({"sourceName": "Chat", "sourceType": "image_source"})
                )
                .contains("browser_source")
        );
    }

    #[rstest]
    fn typed_properties_require_the_right_kind(mut session: Session) {
        session.ok(
            "SetTextFreetype2Properties",
            json!({"source": "Headline", "text": "We are live"}),
        );
        let props = session.ok("GetTextFreetype2Properties", json!({"source": "Headline"}));
        assert_eq!(props["text"], "We are live");
        assert_eq!(props["source"], "Headline");

        assert_eq!(
            session.err("GetTextGDIPlusProperties", json!({"source": "Headline"})),
            "source 'Headline' is not a text GDI+ source"
        );
        assert_eq!(
            session.err("GetBrowserSourceProperties", json!({"source": "Camera"})),
            "source 'Camera' is not a browser source"
        );
    }

    #[rstest]
    fn listings_cover_every_source(mut session: Session) {
        let list = session.ok("GetSourcesList", json!({}));
        assert_eq!(list["sources"].as_array().map(Vec::len), Some(6));
        let types = session.ok("GetSourceTypesList", json!({}));
        assert_eq!(types["types"][0]["typeId"], "v4l2_input");
    }
}
