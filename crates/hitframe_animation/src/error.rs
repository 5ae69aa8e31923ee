//! Animation error types

use hitframe_core::{Frame, ValueKind};
use thiserror::Error;

/// Errors raised by track editing operations.
///
/// Empty tracks, out-of-range frames, dangling links and duplicate-frame
/// inserts are not errors: they clamp, hold, or replace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A value of the wrong kind was written to a track
    #[error("Value kind mismatch: track holds {expected}, got {found}")]
    KindMismatch { expected: ValueKind, found: ValueKind },

    /// A keyframe id does not belong to the track
    #[error("Keyframe is not part of this track")]
    UnknownKeyframe,

    /// No keyframe exists at the requested frame
    #[error("No keyframe at frame {0}")]
    UnknownFrame(Frame),

    /// A link needs at least two distinct members
    #[error("A link needs at least 2 keyframes, got {0}")]
    TooFewMembers(usize),

    /// An interpolation mode name could not be parsed
    #[error("Unknown interpolation mode: {0}")]
    UnknownMode(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
