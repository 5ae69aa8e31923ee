//! Pending link spans
//!
//! Dragging across the timeline creates a link between the frame where the
//! drag started and a border the user can keep extending, with the mouse or
//! with the arrow keys. The session is a plain value: commit it into a track
//! or drop it to cancel.

use crate::easing::InterpolationMode;
use crate::error::Result;
use crate::link::LinkId;
use crate::track::KeyframeableValue;
use hitframe_core::Frame;
use std::ops::RangeInclusive;
use tracing::debug;

/// An in-progress link creation over a span of frames
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSpan {
    start: Frame,
    border: Frame,
    mode: InterpolationMode,
}

impl PendingSpan {
    /// Start a span anchored at `frame`
    pub fn begin(frame: Frame, mode: InterpolationMode) -> Self {
        Self {
            start: frame,
            border: frame,
            mode,
        }
    }

    pub fn start(&self) -> Frame {
        self.start
    }

    pub fn border(&self) -> Frame {
        self.border
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InterpolationMode) {
        self.mode = mode;
    }

    /// Move the free border to `frame`
    pub fn drag_to(&mut self, frame: Frame) {
        self.border = frame;
    }

    /// Move the free border by `delta` frames
    pub fn nudge(&mut self, delta: Frame) {
        self.border = self.border.saturating_add(delta);
    }

    /// Covered frames, lowest first regardless of drag direction
    pub fn range(&self) -> RangeInclusive<Frame> {
        self.start.min(self.border)..=self.start.max(self.border)
    }

    /// Number of frames between the two ends
    pub fn len(&self) -> u32 {
        self.start.abs_diff(self.border)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.border
    }

    /// Link every keyframe of `track` inside the span.
    ///
    /// Missing end keyframes are created holding the value the track
    /// currently evaluates to there, so committing never changes the value
    /// at either end. An empty span commits nothing.
    pub fn commit(self, track: &mut KeyframeableValue) -> Result<Option<LinkId>> {
        if self.is_empty() {
            return Ok(None);
        }

        let range = self.range();
        let mut batch = track.batch();
        for edge in [*range.start(), *range.end()] {
            if batch.track().id_at(edge).is_none() {
                let value = batch.interpolate(edge).value;
                batch.set_value_at_frame(edge, value)?;
            }
        }

        let members = batch.track().ids_in_range(range.clone());
        let link = batch.add_link(&members, self.mode)?;
        debug!(
            start = *range.start(),
            end = *range.end(),
            members = members.len(),
            "pending span committed"
        );
        Ok(Some(link))
    }

    /// Discard the session
    pub fn cancel(self) {}
}
