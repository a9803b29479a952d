//! In-memory studio model shared by every connection.
//!
//! The model holds scenes, sources, transitions and output state. Command
//! handlers reach it through [`StudioHandle::with_studio`], holding the lock
//! only for their own critical section.

mod errors;
mod model;
mod outputs;
mod scenes;
mod sources;
mod state;

use std::sync::{Arc, Mutex};

use tracing::warn;

pub use errors::{EntityKind, StudioError};
pub use model::{
    ALIGN_TOP_LEFT, BOUNDS_NONE, Bounds, Crop, Filter, FilterMovement, ItemRef, MediaPlayback,
    MediaState, MonitorType, Output, Position, RecordingState, Scale, Scene, SceneItem, Settings,
    Source, StreamSettings, Transform, Transition, TransitionOverride, VideoSettings,
};
pub use sources::{BROWSER_TYPES, TEXT_FREETYPE2_TYPES, TEXT_GDIPLUS_TYPES, merge};
pub use state::{STUDIO_VERSION, Studio};

pub(crate) const STUDIO_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::studio");

/// Shared, lock-protected access to the studio.
#[derive(Clone, Debug, Default)]
pub struct StudioHandle {
    inner: Arc<Mutex<Studio>>,
}

impl StudioHandle {
    /// Wraps `studio` for sharing.
    pub fn new(studio: Studio) -> Self {
        Self {
            inner: Arc::new(Mutex::new(studio)),
        }
    }

    /// Runs `f` with exclusive access to the studio.
    ///
    /// A lock poisoned by a panicking handler is recovered so that one
    /// failed command cannot wedge every other connection.
    pub fn with_studio<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Studio) -> R,
    {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| {
            warn!(
                target: STUDIO_TARGET,
                "studio lock poisoned by a panicking handler, recovering"
            );
            poisoned.into_inner()
        });
        f(&mut guard)
    }
}
