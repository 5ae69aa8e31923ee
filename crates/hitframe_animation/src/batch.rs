//! Batch edits
//!
//! Rewriting many keyframes one by one would recompute the track cache after
//! each step. A [`BatchEdit`] borrows the track for the duration of the bulk
//! operation and performs the edits without cache maintenance. Dropping the
//! guard, on any exit path, dissolves links left with fewer than two members
//! and recomputes the cache once.
//!
//! ```rust
//! use hitframe_animation::{InterpolationMode, KeyframeableValue};
//! use hitframe_core::{EntityId, Value};
//!
//! let mut track = KeyframeableValue::new(EntityId::default(), "rotation", Value::Float(0.0));
//! {
//!     let mut batch = track.batch();
//!     for frame in 0..10 {
//!         batch.set_value_at_frame(frame * 4, Value::Float(frame as f32)).unwrap();
//!     }
//!     batch.scale_time(0.5);
//! }
//! assert_eq!(track.last_frame(), Some(18));
//! ```

use crate::easing::InterpolationMode;
use crate::error::Result;
use crate::keyframe::{Keyframe, KeyframeId};
use crate::link::LinkId;
use crate::track::{Interpolated, KeyframeableValue};
use hitframe_core::{Frame, Value};
use tracing::debug;

/// Scoped bulk edit of one track
pub struct BatchEdit<'a> {
    track: &'a mut KeyframeableValue,
    edits: usize,
}

impl<'a> BatchEdit<'a> {
    pub(crate) fn new(track: &'a mut KeyframeableValue) -> Self {
        track.invalidate_cache();
        Self { track, edits: 0 }
    }

    /// Read access to the track being edited
    pub fn track(&self) -> &KeyframeableValue {
        &*self.track
    }

    pub fn add(&mut self, keyframe: Keyframe) -> Result<KeyframeId> {
        self.edits += 1;
        self.track.insert_raw(keyframe)
    }

    pub fn set_value_at_frame(&mut self, frame: Frame, value: Value) -> Result<KeyframeId> {
        self.add(Keyframe::new(frame, value))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Keyframe> {
        self.edits += 1;
        self.track.remove_at_raw(index)
    }

    /// Remove the keyframe at `frame`. Links it leaves dangling are swept
    /// when the batch ends.
    pub fn remove_keyframe_at_frame(&mut self, frame: Frame) -> bool {
        match self.track.search(frame) {
            Ok(index) => self.remove_at(index).is_some(),
            Err(_) => false,
        }
    }

    pub fn add_link(&mut self, members: &[KeyframeId], mode: InterpolationMode) -> Result<LinkId> {
        self.edits += 1;
        self.track.add_link_raw(members, mode)
    }

    pub fn remove_link(&mut self, id: LinkId) -> bool {
        self.edits += 1;
        self.track.remove_link_raw(id)
    }

    /// Rewrite every keyframe's frame through `map`. Keyframes that collide
    /// on a frame keep the one that came last.
    pub fn retime(&mut self, map: impl FnMut(Frame) -> Frame) {
        self.edits += self.track.len();
        self.track.retime_raw(map);
    }

    /// Multiply every frame by `factor`, rounding to the nearest frame
    pub fn scale_time(&mut self, factor: f32) {
        self.retime(|frame| (frame as f32 * factor).round() as Frame);
    }

    /// Offset every frame by `delta`, saturating at the frame range
    pub fn shift(&mut self, delta: Frame) {
        self.retime(|frame| frame.saturating_add(delta));
    }

    /// Evaluate the track mid-batch. Correct, but never written to the cache.
    pub fn interpolate(&self, frame: Frame) -> Interpolated {
        self.track.sample(frame)
    }
}

impl Drop for BatchEdit<'_> {
    fn drop(&mut self) {
        let pruned = self.track.prune_links_raw();
        self.track.refresh_cache();
        debug!(
            track = %self.track.name(),
            edits = self.edits,
            pruned,
            "batch edit finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitframe_core::EntityId;

    fn track() -> KeyframeableValue {
        let mut track = KeyframeableValue::new(EntityId::default(), "x", Value::Float(0.0));
        track.set_value_at_frame(0, Value::Float(0.0)).unwrap();
        track.set_value_at_frame(10, Value::Float(10.0)).unwrap();
        track.set_value_at_frame(20, Value::Float(20.0)).unwrap();
        track
            .add_link_at_frames(&[0, 10, 20], InterpolationMode::Linear)
            .unwrap();
        track
    }

    #[test]
    fn test_batch_recomputes_cache_on_drop() {
        let mut track = track();
        track.cache_value(10);
        assert_eq!(track.cached_value(), Value::Float(10.0));

        {
            let mut batch = track.batch();
            batch.set_value_at_frame(10, Value::Float(-5.0)).unwrap();
            assert_eq!(batch.interpolate(10).value, Value::Float(-5.0));
            batch.shift(5);
        }

        assert_eq!(track.cached_frame(), 10);
        assert_eq!(track.cached_value(), track.sample(10).value);
    }

    #[test]
    fn test_batch_sweeps_dangling_links() {
        let mut track = track();
        {
            let mut batch = track.batch();
            assert!(batch.remove_keyframe_at_frame(0));
            assert!(batch.remove_keyframe_at_frame(10));
            // Mid-batch the link is still there with one member
            assert_eq!(batch.track().link_count(), 1);
        }
        assert_eq!(track.link_count(), 0);
    }

    #[test]
    fn test_scale_time_merges_collisions() {
        let mut track = track();
        track.set_value_at_frame(11, Value::Float(11.0)).unwrap();
        {
            let mut batch = track.batch();
            batch.scale_time(0.1);
        }
        let frames: Vec<Frame> = track.keyframes().map(|kf| kf.frame).collect();
        assert_eq!(frames, vec![0, 1, 2]);
        // 10 and 11 both land on 1; the later one wins
        assert_eq!(track.keyframe_at(1).unwrap().value, Value::Float(11.0));
        // The link lost its middle member but still spans 0..2
        let link = track.links().next().unwrap();
        assert_eq!(track.member_frames(link.id()), Some(vec![0, 2]));
    }

    #[test]
    fn test_shift_saturates_at_frame_range() {
        let mut track = track();
        track.batch().shift(i32::MAX - 10);
        let frames: Vec<Frame> = track.keyframes().map(|kf| kf.frame).collect();
        // 10 lands on the top frame and 20 clamps onto it; the later one wins
        assert_eq!(frames, vec![i32::MAX - 10, i32::MAX]);
        assert_eq!(track.keyframe_at(i32::MAX).unwrap().value, Value::Float(20.0));
        assert_eq!(track.link_count(), 1);

        track.batch().shift(i32::MIN);
        assert_eq!(track.first_frame(), Some(-11));
        assert_eq!(track.last_frame(), Some(-1));
    }

    #[test]
    fn test_batch_restores_cache_on_early_return() {
        fn fails(track: &mut KeyframeableValue) -> Result<()> {
            let mut batch = track.batch();
            batch.set_value_at_frame(0, Value::Float(100.0))?;
            batch.set_value_at_frame(1, Value::Int(1))?;
            Ok(())
        }

        let mut track = track();
        assert!(fails(&mut track).is_err());
        assert_eq!(track.cached_value(), Value::Float(100.0));
    }
}
