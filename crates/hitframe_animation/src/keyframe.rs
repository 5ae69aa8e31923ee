//! Keyframes
//!
//! A keyframe is a single `(frame, value)` fact on one property track. It is
//! owned by the track's arena and refers back to the link that groups it, if
//! any.

use crate::link::LinkId;
use hitframe_core::{Frame, Value};
use slotmap::new_key_type;
use std::cmp::Ordering;

new_key_type! {
    /// Handle to a keyframe within its track's arena
    pub struct KeyframeId;
}

/// A single keyframe on a property track
///
/// Ordering and equality consider the frame only: two keyframes on the same
/// frame are the same slot in the track, whatever their values.
#[derive(Clone, Debug)]
pub struct Keyframe {
    /// Frame this keyframe sits on
    pub frame: Frame,
    /// Value held at this frame
    pub value: Value,
    pub(crate) link: Option<LinkId>,
}

impl Keyframe {
    pub fn new(frame: Frame, value: Value) -> Self {
        Self {
            frame,
            value,
            link: None,
        }
    }

    /// The link this keyframe belongs to, if any
    pub fn link(&self) -> Option<LinkId> {
        self.link
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }
}

impl PartialEq for Keyframe {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame
    }
}

impl Eq for Keyframe {}

impl PartialOrd for Keyframe {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyframe {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frame.cmp(&other.frame)
    }
}
