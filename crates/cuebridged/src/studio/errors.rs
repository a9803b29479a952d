//! Failures raised by studio model operations.

use std::fmt;

use thiserror::Error;

/// Kinds of named studio entities, used in lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A scene.
    Scene,
    /// An input source, or a scene used as a source.
    Source,
    /// An item placed in a scene.
    SceneItem,
    /// A filter attached to a source.
    Filter,
    /// A scene transition.
    Transition,
    /// A settings profile.
    Profile,
    /// A scene collection.
    SceneCollection,
    /// A generic output.
    Output,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scene => "scene",
            Self::Source => "source",
            Self::SceneItem => "scene item",
            Self::Filter => "filter",
            Self::Transition => "transition",
            Self::Profile => "profile",
            Self::SceneCollection => "scene collection",
            Self::Output => "output",
        })
    }
}

/// Errors returned by [`Studio`](super::Studio) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    /// A named entity does not exist.
    #[error("{kind} '{name}' does not exist")]
    NotFound {
        /// Entity kind looked up.
        kind: EntityKind,
        /// Name or identifier that missed.
        name: String,
    },
    /// A name is already taken.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Entity kind being created or renamed.
        kind: EntityKind,
        /// Conflicting name.
        name: String,
    },
    /// The operation contradicts the current state.
    #[error("{0}")]
    Conflict(&'static str),
    /// The operation needs studio mode.
    #[error("studio mode not enabled")]
    StudioModeDisabled,
    /// The source exists but is the wrong kind for the operation.
    #[error("source '{name}' is not a {expected} source")]
    WrongSourceKind {
        /// Source name.
        name: String,
        /// Kind the operation needs.
        expected: &'static str,
    },
    /// A supplied value is out of range or otherwise unusable.
    #[error("{0}")]
    InvalidValue(String),
}

impl StudioError {
    /// Builds a [`StudioError::NotFound`].
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Builds a [`StudioError::AlreadyExists`].
    pub fn already_exists(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Builds a [`StudioError::WrongSourceKind`].
    pub fn wrong_kind(name: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongSourceKind {
            name: name.into(),
            expected,
        }
    }
}
