//! The studio aggregate and its demo seed.

use serde_json::json;

use super::errors::{EntityKind, StudioError};
use super::model::{
    MediaPlayback, Output, RecordingState, Scene, SceneItem, Settings, Source, StreamSettings,
    Transition, VideoSettings,
};

/// Version string reported for the in-memory studio.
pub const STUDIO_VERSION: &str = "27.2.4";

/// Complete application state operated on by command handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Studio {
    pub video: VideoSettings,
    pub filename_formatting: String,
    pub scenes: Vec<Scene>,
    pub current_scene: String,
    pub sources: Vec<Source>,
    /// Desktop and microphone channels, keyed `desktop-1`, `mic-1`, ...
    pub special_sources: Vec<(String, String)>,
    pub transitions: Vec<Transition>,
    pub current_transition: String,
    pub transition_duration_ms: u64,
    pub studio_mode: bool,
    pub preview_scene: Option<String>,
    pub streaming: bool,
    pub recording: RecordingState,
    pub replay_buffer: bool,
    pub replay_saves: u32,
    pub outputs: Vec<Output>,
    pub stream_settings: StreamSettings,
    pub saved_stream_settings: StreamSettings,
    pub profiles: Vec<String>,
    pub current_profile: String,
    pub collections: Vec<String>,
    pub current_collection: String,
    pub recording_folder: String,
    pub captions: Vec<String>,
    pub(super) next_item_id: i64,
}

impl Studio {
    /// A studio with no scenes, sources or outputs beyond the minimum
    /// needed to be consistent: one scene, one transition, one profile and
    /// one collection.
    pub fn empty() -> Self {
        let stream_settings = StreamSettings {
            kind: String::from("rtmp_custom"),
            settings: Settings::new(),
        };
        Self {
            video: VideoSettings {
                base_width: 1920,
                base_height: 1080,
                output_width: 1280,
                output_height: 720,
                fps_numerator: 30,
                fps_denominator: 1,
                scale_type: String::from("VIDEO_SCALE_BICUBIC"),
                video_format: String::from("VIDEO_FORMAT_NV12"),
                color_space: String::from("VIDEO_CS_709"),
                color_range: String::from("VIDEO_RANGE_PARTIAL"),
            },
            filename_formatting: String::from("%CCYY-%MM-%DD %hh-%mm-%ss"),
            scenes: vec![Scene::new("Scene")],
            current_scene: String::from("Scene"),
            sources: Vec::new(),
            special_sources: Vec::new(),
            transitions: vec![Transition {
                name: String::from("Cut"),
                type_id: String::from("cut_transition"),
                fixed: true,
            }],
            current_transition: String::from("Cut"),
            transition_duration_ms: 300,
            studio_mode: false,
            preview_scene: None,
            streaming: false,
            recording: RecordingState::default(),
            replay_buffer: false,
            replay_saves: 0,
            outputs: Vec::new(),
            saved_stream_settings: stream_settings.clone(),
            stream_settings,
            profiles: vec![String::from("Untitled")],
            current_profile: String::from("Untitled"),
            collections: vec![String::from("Untitled")],
            current_collection: String::from("Untitled"),
            recording_folder: String::from("/tmp/recordings"),
            captions: Vec::new(),
            next_item_id: 1,
        }
    }

    /// Allocates the next scene item id. Ids are unique across scenes.
    pub(super) fn allocate_item_id(&mut self) -> i64 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        id
    }

    /// Places `source` at the top of `scene` with a default transform.
    ///
    /// # Errors
    ///
    /// Fails when the scene is missing.
    pub(super) fn place(&mut self, scene: &str, source: &str, visible: bool) -> Result<i64, StudioError> {
        let id = self.allocate_item_id();
        let scene = self.scene_mut(scene)?;
        let mut item = SceneItem::new(id, source);
        item.visible = visible;
        scene.items.push(item);
        Ok(id)
    }

    fn seed_scene(&mut self, name: &str, sources: &[&str]) -> Scene {
        let mut scene = Scene::new(name);
        for source in sources {
            let id = self.allocate_item_id();
            scene.items.push(SceneItem::new(id, *source));
        }
        scene
    }

    /// Whether `name` is taken by a source or a scene.
    pub fn name_in_use(&self, name: &str) -> bool {
        self.sources.iter().any(|source| source.name == name)
            || self.scenes.iter().any(|scene| scene.name == name)
    }

    /// Looks up a profile by name.
    ///
    /// # Errors
    ///
    /// Fails when the profile is missing.
    pub fn set_current_profile(&mut self, name: &str) -> Result<(), StudioError> {
        if !self.profiles.iter().any(|profile| profile == name) {
            return Err(StudioError::not_found(EntityKind::Profile, name));
        }
        name.clone_into(&mut self.current_profile);
        Ok(())
    }

    /// Switches scene collection.
    ///
    /// # Errors
    ///
    /// Fails when the collection is missing.
    pub fn set_current_collection(&mut self, name: &str) -> Result<(), StudioError> {
        if !self.collections.iter().any(|collection| collection == name) {
            return Err(StudioError::not_found(EntityKind::SceneCollection, name));
        }
        name.clone_into(&mut self.current_collection);
        Ok(())
    }
}

impl Default for Studio {
    /// A small demo studio: two scenes, a handful of sources, two
    /// transitions, two profiles and two collections.
    fn default() -> Self {
        let mut studio = Self::empty();
        studio.sources = vec![
            Source::new("Camera", "v4l2_input").with_size(1920, 1080),
            Source::new("Desktop Audio", "pulse_output_capture").with_audio(),
            Source::new("Mic/Aux", "pulse_input_capture").with_audio(),
            Source::new("Intro Video", "ffmpeg_source")
                .with_size(1920, 1080)
                .with_audio()
                .with_settings(object(json!({"local_file": "/media/intro.mp4", "looping": false})))
                .with_media(MediaPlayback::stopped(42_000)),
            Source::new("Headline", "text_ft2_source")
                .with_size(800, 120)
                .with_settings(object(json!({
                    "text": "Starting soon",
                    "font": {"face": "Sans Serif", "size": 48, "style": "Regular", "flags": 0},
                    "color1": 4_294_967_295_u32,
                    "color2": 4_294_967_295_u32,
                    "outline": false,
                    "drop_shadow": false,
                    "word_wrap": false
                }))),
            Source::new("Chat", "browser_source")
                .with_size(400, 600)
                .with_settings(object(json!({
                    "url": "https://example.invalid/chat",
                    "width": 400,
                    "height": 600,
                    "fps": 30,
                    "shutdown": false,
                    "css": ""
                }))),
        ];
        studio.special_sources = vec![
            (String::from("desktop-1"), String::from("Desktop Audio")),
            (String::from("mic-1"), String::from("Mic/Aux")),
        ];

        let live = studio.seed_scene("Live", &["Camera", "Headline", "Chat"]);
        let brb = studio.seed_scene("Be Right Back", &["Intro Video", "Headline"]);
        studio.scenes = vec![live, brb];
        studio.current_scene = String::from("Live");

        studio.transitions.push(Transition {
            name: String::from("Fade"),
            type_id: String::from("fade_transition"),
            fixed: false,
        });
        studio.current_transition = String::from("Fade");

        studio.outputs = vec![Output {
            name: String::from("virtualcam_output"),
            type_id: String::from("v4l2_output"),
            width: 1280,
            height: 720,
            active: false,
            settings: Settings::new(),
        }];

        studio.profiles = vec![String::from("Untitled"), String::from("Streaming")];
        studio.collections = vec![String::from("Untitled"), String::from("Events")];
        studio
    }
}

fn object(value: serde_json::Value) -> Settings {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Settings::new(),
    }
}
