//! Plain data making up the in-memory studio.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// Free-form settings object attached to sources, filters and outputs.
pub type Settings = Map<String, Value>;

/// Canvas and output geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSettings {
    pub base_width: u32,
    pub base_height: u32,
    pub output_width: u32,
    pub output_height: u32,
    pub fps_numerator: u32,
    pub fps_denominator: u32,
    pub scale_type: String,
    pub video_format: String,
    pub color_space: String,
    pub color_range: String,
}

impl VideoSettings {
    /// Frames per second as a floating-point value.
    pub fn fps(&self) -> f64 {
        f64::from(self.fps_numerator) / f64::from(self.fps_denominator.max(1))
    }
}

/// A scene and the items placed in it, bottom first.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub name: String,
    pub items: Vec<SceneItem>,
    pub transition_override: Option<TransitionOverride>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            transition_override: None,
        }
    }
}

/// Transition forced whenever a particular scene is switched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOverride {
    pub transition: String,
    pub duration_ms: Option<u64>,
}

/// A source placed in a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub id: i64,
    pub source: String,
    pub visible: bool,
    pub locked: bool,
    pub transform: Transform,
}

impl SceneItem {
    /// A visible, unlocked item with the default transform.
    pub fn new(id: i64, source: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            visible: true,
            locked: false,
            transform: Transform::default(),
        }
    }
}

/// Placement of a scene item on the canvas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transform {
    pub position: Position,
    pub rotation: f64,
    pub scale: Scale,
    pub crop: Crop,
    pub bounds: Bounds,
}

/// Alignment flags: left/top/right/bottom bits, centre when zero.
pub const ALIGN_TOP_LEFT: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub alignment: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            alignment: ALIGN_TOP_LEFT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Crop {
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub kind: String,
    pub alignment: u32,
    pub x: f64,
    pub y: f64,
}

/// Bounds type meaning "no bounding box".
pub const BOUNDS_NONE: &str = "OBS_BOUNDS_NONE";

impl Default for Bounds {
    fn default() -> Self {
        Self {
            kind: String::from(BOUNDS_NONE),
            alignment: 0,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// Identifies a scene item either by numeric id or by source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Id(i64),
    Name(String),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// An input source.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub type_id: String,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
    /// Linear volume multiplier, `0.0..=1.0` is unity or below.
    pub volume: f64,
    pub muted: bool,
    pub sync_offset_ns: i64,
    pub monitor_type: MonitorType,
    pub settings: Settings,
    pub filters: Vec<Filter>,
    pub media: Option<MediaPlayback>,
}

impl Source {
    /// Creates a silent video source.
    pub fn new(name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: type_id.into(),
            width: 0,
            height: 0,
            has_audio: false,
            volume: 1.0,
            muted: false,
            sync_offset_ns: 0,
            monitor_type: MonitorType::None,
            settings: Settings::new(),
            filters: Vec::new(),
            media: None,
        }
    }

    /// Sets the native size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Marks the source as producing audio.
    #[must_use]
    pub fn with_audio(mut self) -> Self {
        self.has_audio = true;
        self
    }

    /// Replaces the settings object.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Attaches a media playback state.
    #[must_use]
    pub fn with_media(mut self, media: MediaPlayback) -> Self {
        self.media = Some(media);
        self
    }

    /// Whether audio from this source is currently audible.
    pub fn audio_active(&self) -> bool {
        self.has_audio && !self.muted
    }
}

/// Audio monitoring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorType {
    #[default]
    None,
    MonitorOnly,
    MonitorAndOutput,
}

impl MonitorType {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MonitorOnly => "monitorOnly",
            Self::MonitorAndOutput => "monitorAndOutput",
        }
    }
}

impl FromStr for MonitorType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "monitorOnly" => Ok(Self::MonitorOnly),
            "monitorAndOutput" => Ok(Self::MonitorAndOutput),
            other => Err(format!("invalid monitor type '{other}'")),
        }
    }
}

/// A filter attached to a source.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub type_id: String,
    pub enabled: bool,
    pub settings: Settings,
}

/// Where a filter moves relative to its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMovement {
    Up,
    Down,
    Top,
    Bottom,
}

impl FromStr for FilterMovement {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(format!("invalid movement type '{other}'")),
        }
    }
}

/// Playback state of a media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaState {
    #[default]
    None,
    Playing,
    Opening,
    Buffering,
    Paused,
    Stopped,
    Ended,
    Error,
}

impl MediaState {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Playing => "playing",
            Self::Opening => "opening",
            Self::Buffering => "buffering",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Ended => "ended",
            Self::Error => "error",
        }
    }
}

/// Playlist and cursor of a media source. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPlayback {
    pub state: MediaState,
    pub duration_ms: i64,
    pub time_ms: i64,
    pub playlist_len: usize,
    pub playlist_index: usize,
}

impl MediaPlayback {
    /// A stopped single-file playlist of the given duration.
    pub fn stopped(duration_ms: i64) -> Self {
        Self {
            state: MediaState::Stopped,
            duration_ms,
            time_ms: 0,
            playlist_len: 1,
            playlist_index: 0,
        }
    }

    /// Moves the cursor, clamped to the media bounds.
    pub fn seek(&mut self, time_ms: i64) {
        self.time_ms = time_ms.clamp(0, self.duration_ms.max(0));
    }
}

/// A scene transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub name: String,
    pub type_id: String,
    /// Fixed transitions ignore the configured duration.
    pub fixed: bool,
}

/// A generic output (virtual camera, secondary stream, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub name: String,
    pub type_id: String,
    pub width: u32,
    pub height: u32,
    pub active: bool,
    pub settings: Settings,
}

/// Streaming service selection.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSettings {
    pub kind: String,
    pub settings: Settings,
}

/// Recording output state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordingState {
    pub active: bool,
    pub paused: bool,
    pub filename: Option<String>,
}
