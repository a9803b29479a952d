//! Static binding of command names to handlers.

use super::{
    ReplyFn, collections, filters, general, media, outputs, recording, scene_items, scenes,
    sources, streaming, studio_mode, transitions, unsupported,
};

/// Every unconditionally registered command.
pub(super) const COMMANDS: &[(&str, ReplyFn)] = &[
    // general
    ("GetVersion", general::get_version),
    ("GetAuthRequired", general::get_auth_required),
    ("Authenticate", general::authenticate),
    ("SetHeartbeat", general::set_heartbeat),
    ("GetStats", general::get_stats),
    ("GetVideoInfo", general::get_video_info),
    ("SetFilenameFormatting", general::set_filename_formatting),
    ("GetFilenameFormatting", general::get_filename_formatting),
    ("BroadcastCustomMessage", unsupported::unsupported),
    ("OpenProjector", unsupported::unsupported),
    ("TriggerHotkeyByName", unsupported::unsupported),
    ("TriggerHotkeyBySequence", unsupported::unsupported),
    // scenes
    ("SetCurrentScene", scenes::set_current_scene),
    ("GetCurrentScene", scenes::get_current_scene),
    ("GetSceneList", scenes::get_scene_list),
    ("CreateScene", scenes::create_scene),
    ("SetSceneTransitionOverride", scenes::set_scene_transition_override),
    ("RemoveSceneTransitionOverride", scenes::remove_scene_transition_override),
    ("GetSceneTransitionOverride", scenes::get_scene_transition_override),
    // scene items
    ("GetSceneItemList", scene_items::get_scene_item_list),
    ("SetSceneItemRender", scene_items::set_scene_item_render),
    ("SetSceneItemPosition", scene_items::set_scene_item_position),
    ("SetSceneItemTransform", scene_items::set_scene_item_transform),
    ("SetSceneItemCrop", scene_items::set_scene_item_crop),
    ("GetSceneItemProperties", scene_items::get_scene_item_properties),
    ("SetSceneItemProperties", scene_items::set_scene_item_properties),
    ("ResetSceneItem", scene_items::reset_scene_item),
    ("DeleteSceneItem", scene_items::delete_scene_item),
    ("AddSceneItem", scene_items::add_scene_item),
    ("DuplicateSceneItem", scene_items::duplicate_scene_item),
    ("ReorderSceneItems", scene_items::reorder_scene_items),
    // streaming
    ("GetStreamingStatus", streaming::get_streaming_status),
    ("StartStopStreaming", streaming::start_stop_streaming),
    ("StartStreaming", streaming::start_streaming),
    ("StopStreaming", streaming::stop_streaming),
    ("SetStreamSettings", streaming::set_stream_settings),
    ("GetStreamSettings", streaming::get_stream_settings),
    ("SaveStreamSettings", streaming::save_stream_settings),
    // recording
    ("StartStopRecording", recording::start_stop_recording),
    ("StartRecording", recording::start_recording),
    ("StopRecording", recording::stop_recording),
    ("PauseRecording", recording::pause_recording),
    ("ResumeRecording", recording::resume_recording),
    ("GetRecordingStatus", recording::get_recording_status),
    ("SetRecordingFolder", recording::set_recording_folder),
    ("GetRecordingFolder", recording::get_recording_folder),
    ("GetReplayBufferStatus", recording::get_replay_buffer_status),
    ("StartStopReplayBuffer", recording::start_stop_replay_buffer),
    ("StartReplayBuffer", recording::start_replay_buffer),
    ("StopReplayBuffer", recording::stop_replay_buffer),
    ("SaveReplayBuffer", recording::save_replay_buffer),
    // transitions
    ("GetTransitionList", transitions::get_transition_list),
    ("GetCurrentTransition", transitions::get_current_transition),
    ("SetCurrentTransition", transitions::set_current_transition),
    ("SetTransitionDuration", transitions::set_transition_duration),
    ("GetTransitionDuration", transitions::get_transition_duration),
    ("GetTransitionPosition", transitions::get_transition_position),
    // sources
    ("SetVolume", sources::set_volume),
    ("GetVolume", sources::get_volume),
    ("ToggleMute", sources::toggle_mute),
    ("SetMute", sources::set_mute),
    ("GetMute", sources::get_mute),
    ("GetAudioActive", sources::get_audio_active),
    ("SetSourceName", sources::set_source_name),
    ("SetSyncOffset", sources::set_sync_offset),
    ("GetSyncOffset", sources::get_sync_offset),
    ("GetSpecialSources", sources::get_special_sources),
    ("GetSourcesList", sources::get_sources_list),
    ("GetSourceTypesList", sources::get_source_types_list),
    ("GetSourceSettings", sources::get_source_settings),
    ("SetSourceSettings", sources::set_source_settings),
    ("GetAudioMonitorType", sources::get_audio_monitor_type),
    ("SetAudioMonitorType", sources::set_audio_monitor_type),
    ("GetTextGDIPlusProperties", sources::get_text_gdi_plus_properties),
    ("SetTextGDIPlusProperties", sources::set_text_gdi_plus_properties),
    ("GetTextFreetype2Properties", sources::get_text_freetype2_properties),
    ("SetTextFreetype2Properties", sources::set_text_freetype2_properties),
    ("GetBrowserSourceProperties", sources::get_browser_source_properties),
    ("SetBrowserSourceProperties", sources::set_browser_source_properties),
    ("TakeSourceScreenshot", unsupported::unsupported),
    ("SubscribeAudioMeter", unsupported::unsupported),
    ("UnsubscribeAudioMeter", unsupported::unsupported),
    // filters
    ("GetSourceFilters", filters::get_source_filters),
    ("GetSourceFilterInfo", filters::get_source_filter_info),
    ("AddFilterToSource", filters::add_filter_to_source),
    ("RemoveFilterFromSource", filters::remove_filter_from_source),
    ("ReorderSourceFilter", filters::reorder_source_filter),
    ("MoveSourceFilter", filters::move_source_filter),
    ("SetSourceFilterSettings", filters::set_source_filter_settings),
    ("SetSourceFilterVisibility", filters::set_source_filter_visibility),
    // collections and profiles
    ("SetCurrentSceneCollection", collections::set_current_scene_collection),
    ("GetCurrentSceneCollection", collections::get_current_scene_collection),
    ("ListSceneCollections", collections::list_scene_collections),
    ("SetCurrentProfile", collections::set_current_profile),
    ("GetCurrentProfile", collections::get_current_profile),
    ("ListProfiles", collections::list_profiles),
    // studio mode
    ("GetStudioModeStatus", studio_mode::get_studio_mode_status),
    ("GetPreviewScene", studio_mode::get_preview_scene),
    ("SetPreviewScene", studio_mode::set_preview_scene),
    ("TransitionToProgram", studio_mode::transition_to_program),
    ("EnableStudioMode", studio_mode::enable_studio_mode),
    ("DisableStudioMode", studio_mode::disable_studio_mode),
    ("ToggleStudioMode", studio_mode::toggle_studio_mode),
    // outputs
    ("ListOutputs", outputs::list_outputs),
    ("GetOutputInfo", outputs::get_output_info),
    ("StartOutput", outputs::start_output),
    ("StopOutput", outputs::stop_output),
    // media
    ("PlayPauseMedia", media::play_pause_media),
    ("RestartMedia", media::restart_media),
    ("StopMedia", media::stop_media),
    ("NextMedia", media::next_media),
    ("PreviousMedia", media::previous_media),
    ("GetMediaDuration", media::get_media_duration),
    ("GetMediaTime", media::get_media_time),
    ("SetMediaTime", media::set_media_time),
    ("ScrubMedia", media::scrub_media),
    ("GetMediaState", media::get_media_state),
    ("GetMediaSourcesList", media::get_media_sources_list),
];

/// Registered only with the captions capability.
pub(super) const CAPTION_COMMANDS: &[(&str, ReplyFn)] = &[("SendCaptions", streaming::send_captions)];

/// Alternate names bound to an existing command's handler.
pub(super) const ALIASES: &[(&str, &str)] = &[("SetSourceRender", "SetSceneItemRender")];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn table_names_are_unique() {
        let mut seen = HashSet::new();
        for (name, _) in COMMANDS.iter().chain(CAPTION_COMMANDS) {
            assert!(seen.insert(*name), "{name} bound twice");
        }
        for (alias, target) in ALIASES {
            assert!(!seen.contains(alias), "{alias} shadows a command");
            assert!(seen.contains(target), "{alias} targets unbound {target}");
        }
    }
}
