//! Keyframeable property tracks
//!
//! A [`KeyframeableValue`] is the ordered collection of keyframes and links
//! for one property of one animation object. It owns both arenas, runs the
//! interpolation algorithm, and keeps a single-slot cache of the last
//! evaluated value.
//!
//! Invariants held after every public method returns:
//!
//! - `order` is sorted ascending by frame with unique frames
//! - every link member is present in the keyframe arena, and every linked
//!   keyframe points back at exactly the link listing it
//! - the cache holds `sample(cursor)` for the current cursor
//!
//! Bulk edits go through [`KeyframeableValue::batch`], which skips the cache
//! recompute until the batch is dropped.

use crate::batch::BatchEdit;
use crate::easing::InterpolationMode;
use crate::error::{AnimationError, Result};
use crate::keyframe::{Keyframe, KeyframeId};
use crate::link::{KeyframeLink, LinkId};
use hitframe_core::{EntityId, Frame, Value, ValueKind};
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::ops::RangeInclusive;
use tracing::{debug, trace};

/// Result of evaluating a track at a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolated {
    pub value: Value,
    /// False when the track has no keyframes and `value` is the default
    pub found: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CachedSample {
    value: Value,
    frame: Frame,
}

/// The keyframes and links of one animated property
#[derive(Clone, Debug)]
pub struct KeyframeableValue {
    owner: EntityId,
    name: String,
    default: Value,
    keyframes: SlotMap<KeyframeId, Keyframe>,
    /// Keyframe ids sorted ascending by frame
    order: Vec<KeyframeId>,
    links: SlotMap<LinkId, KeyframeLink>,
    cache: Option<CachedSample>,
    /// Frame the cache is kept coherent for
    cursor: Frame,
}

impl KeyframeableValue {
    /// Create an empty track. The value kind is fixed by `default`.
    pub fn new(owner: EntityId, name: impl Into<String>, default: Value) -> Self {
        let mut track = Self {
            owner,
            name: name.into(),
            default,
            keyframes: SlotMap::with_key(),
            order: Vec::new(),
            links: SlotMap::with_key(),
            cache: None,
            cursor: 0,
        };
        track.refresh_cache();
        track
    }

    /// Create a track holding its default as a keyframe at frame 0
    pub fn with_default_keyframe(owner: EntityId, name: impl Into<String>, default: Value) -> Self {
        let mut track = Self::new(owner, name, default);
        let id = track.keyframes.insert(Keyframe::new(0, default));
        track.order.push(id);
        track.refresh_cache();
        track
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Value {
        self.default
    }

    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keyframes in ascending frame order
    pub fn keyframes(&self) -> impl Iterator<Item = &Keyframe> + '_ {
        self.order.iter().map(move |id| &self.keyframes[*id])
    }

    /// Keyframe ids in ascending frame order
    pub fn keyframe_ids(&self) -> &[KeyframeId] {
        &self.order
    }

    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.get(id)
    }

    /// Keyframe at the given ordered index
    pub fn keyframe_at_index(&self, index: usize) -> Option<&Keyframe> {
        self.order.get(index).map(|id| &self.keyframes[*id])
    }

    pub fn keyframe_at(&self, frame: Frame) -> Option<&Keyframe> {
        self.id_at(frame).map(|id| &self.keyframes[id])
    }

    pub fn id_at(&self, frame: Frame) -> Option<KeyframeId> {
        self.search(frame).ok().map(|index| self.order[index])
    }

    /// Binary search by frame: `Ok(index)` on an exact hit, otherwise the
    /// insertion point
    pub fn search(&self, frame: Frame) -> std::result::Result<usize, usize> {
        self.order
            .binary_search_by_key(&frame, |id| self.keyframes[*id].frame)
    }

    pub fn first_frame(&self) -> Option<Frame> {
        self.order.first().map(|id| self.keyframes[*id].frame)
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.order.last().map(|id| self.keyframes[*id].frame)
    }

    /// Nearest keyframe frame strictly before `frame`
    pub fn previous_frame(&self, frame: Frame) -> Option<Frame> {
        let index = match self.search(frame) {
            Ok(index) | Err(index) => index,
        };
        index
            .checked_sub(1)
            .map(|i| self.keyframes[self.order[i]].frame)
    }

    /// Nearest keyframe frame strictly after `frame`
    pub fn next_frame(&self, frame: Frame) -> Option<Frame> {
        let index = match self.search(frame) {
            Ok(index) => index + 1,
            Err(index) => index,
        };
        self.order.get(index).map(|id| self.keyframes[*id].frame)
    }

    /// Ids of keyframes whose frame lies in `range`, ascending
    pub fn ids_in_range(&self, range: RangeInclusive<Frame>) -> Vec<KeyframeId> {
        let start = match self.search(*range.start()) {
            Ok(index) | Err(index) => index,
        };
        self.order[start..]
            .iter()
            .copied()
            .take_while(|id| self.keyframes[*id].frame <= *range.end())
            .collect()
    }

    pub fn links(&self) -> impl Iterator<Item = &KeyframeLink> + '_ {
        self.links.values()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn link(&self, id: LinkId) -> Option<&KeyframeLink> {
        self.links.get(id)
    }

    /// The link containing the keyframe at `frame`, if any
    pub fn link_at(&self, frame: Frame) -> Option<&KeyframeLink> {
        self.keyframe_at(frame)
            .and_then(|kf| kf.link)
            .and_then(|id| self.links.get(id))
    }

    /// Frames of a link's members, ascending
    pub fn member_frames(&self, id: LinkId) -> Option<Vec<Frame>> {
        let link = self.links.get(id)?;
        Some(
            link.members()
                .iter()
                .filter_map(|m| self.keyframes.get(*m))
                .map(|kf| kf.frame)
                .collect(),
        )
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate the track at `frame` without touching the cache.
    ///
    /// Exact keyframe frames return the stored value untouched. Other frames
    /// hold the nearest earlier keyframe (clamped to the first) unless that
    /// keyframe belongs to a link with at least two members, in which case
    /// the link's span is eased and blended. Frames outside a link's span
    /// take the span's boundary value.
    pub fn sample(&self, frame: Frame) -> Interpolated {
        let Some(&first_id) = self.order.first() else {
            return Interpolated {
                value: self.default,
                found: false,
            };
        };

        let anchor_id = match self.search(frame) {
            Ok(index) => {
                return Interpolated {
                    value: self.keyframes[self.order[index]].value,
                    found: true,
                };
            }
            Err(0) => first_id,
            Err(index) => self.order[index - 1],
        };

        let anchor = &self.keyframes[anchor_id];
        let value = match anchor.link.and_then(|id| self.links.get(id)) {
            Some(link) if link.is_valid() => self
                .sample_link(link, frame)
                .unwrap_or(anchor.value),
            _ => anchor.value,
        };

        Interpolated { value, found: true }
    }

    fn sample_link(&self, link: &KeyframeLink, frame: Frame) -> Option<Value> {
        let first = self.keyframes.get(link.first()?)?;
        let last = self.keyframes.get(link.last()?)?;

        if frame <= first.frame {
            return Some(first.value);
        }
        if frame >= last.frame {
            return Some(last.value);
        }

        // Widened so spans wider than i32::MAX frames cannot overflow
        let span = last.frame as f64 - first.frame as f64;
        let progress = ((frame as f64 - first.frame as f64) / span) as f32;
        let eased = link.mode().apply(progress);

        if link.len() == 2 {
            return Some(first.value.lerp(&last.value, eased));
        }

        let members: SmallVec<[&Keyframe; 8]> = link
            .members()
            .iter()
            .filter_map(|id| self.keyframes.get(*id))
            .collect();
        let points: SmallVec<[Value; 8]> = members.iter().map(|kf| kf.value).collect();

        let t = if link.relative_progress() {
            let frames: SmallVec<[Frame; 8]> = members.iter().map(|kf| kf.frame).collect();
            relative_spline_position(&frames, eased)
        } else {
            eased * (points.len() - 1) as f32
        };

        Value::catmull_rom(&points, t)
    }

    /// Evaluate at `frame`, serving and filling the single-slot cache
    pub fn interpolate(&mut self, frame: Frame) -> Interpolated {
        if self.order.is_empty() {
            return Interpolated {
                value: self.default,
                found: false,
            };
        }

        if let Some(cached) = self.cache {
            if cached.frame == frame {
                return Interpolated {
                    value: cached.value,
                    found: true,
                };
            }
        }

        let result = self.sample(frame);
        self.cache = Some(CachedSample {
            value: result.value,
            frame,
        });
        result
    }

    /// Move the cache cursor to `frame` and recompute the cached value there
    pub fn cache_value(&mut self, frame: Frame) -> Value {
        self.cursor = frame;
        self.refresh_cache();
        self.cached_value()
    }

    /// The last cached value, valid for [`cached_frame`](Self::cached_frame)
    pub fn cached_value(&self) -> Value {
        match self.cache {
            Some(cached) => cached.value,
            None => self.sample(self.cursor).value,
        }
    }

    pub fn cached_frame(&self) -> Frame {
        self.cache.map_or(self.cursor, |cached| cached.frame)
    }

    /// Frame the cache is recomputed at after each edit
    pub fn cursor(&self) -> Frame {
        self.cursor
    }

    pub(crate) fn invalidate_cache(&mut self) {
        self.cache = None;
    }

    pub(crate) fn refresh_cache(&mut self) {
        let value = self.sample(self.cursor).value;
        trace!(track = %self.name, frame = self.cursor, %value, "cache recomputed");
        self.cache = Some(CachedSample {
            value,
            frame: self.cursor,
        });
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Insert a keyframe, replacing the value of any keyframe already on the
    /// same frame. A replaced keyframe keeps its link membership.
    pub fn add(&mut self, keyframe: Keyframe) -> Result<KeyframeId> {
        let id = self.insert_raw(keyframe)?;
        self.refresh_cache();
        Ok(id)
    }

    /// Set the property's value at `frame`
    pub fn set_value_at_frame(&mut self, frame: Frame, value: Value) -> Result<KeyframeId> {
        self.add(Keyframe::new(frame, value))
    }

    /// Remove the keyframe at an ordered index, detaching it from its link.
    ///
    /// The link is left in place even if it drops below two members; see
    /// [`prune_links`](Self::prune_links).
    pub fn remove_at(&mut self, index: usize) -> Option<Keyframe> {
        let removed = self.remove_at_raw(index)?;
        self.refresh_cache();
        Some(removed)
    }

    /// Remove the keyframe at `frame` and dissolve any link it leaves with
    /// fewer than two members
    pub fn remove_keyframe_at_frame(&mut self, frame: Frame) -> bool {
        let Ok(index) = self.search(frame) else {
            return false;
        };
        self.remove_at_raw(index);
        self.prune_links_raw();
        self.refresh_cache();
        true
    }

    /// Move the keyframe at `from` to `to`, keeping its value and link.
    ///
    /// A keyframe already at `to` is replaced.
    pub fn move_keyframe(&mut self, from: Frame, to: Frame) -> Result<KeyframeId> {
        let index = self
            .search(from)
            .map_err(|_| AnimationError::UnknownFrame(from))?;
        let id = self.order[index];
        if from == to {
            return Ok(id);
        }

        if let Ok(target) = self.search(to) {
            self.remove_at_raw(target);
        }
        self.order.retain(|other| *other != id);
        self.keyframes[id].frame = to;
        let insert = match self.search(to) {
            Ok(index) | Err(index) => index,
        };
        self.order.insert(insert, id);

        if let Some(link_id) = self.keyframes[id].link {
            if let Some(link) = self.links.get_mut(link_id) {
                link.recompute_borders(&self.keyframes);
            }
        }

        debug!(track = %self.name, from, to, "keyframe moved");
        self.prune_links_raw();
        self.refresh_cache();
        Ok(id)
    }

    /// Group existing keyframes into a new link.
    ///
    /// Members are detached from any link they already belong to; a previous
    /// link left with fewer than two members is dissolved.
    pub fn add_link(&mut self, members: &[KeyframeId], mode: InterpolationMode) -> Result<LinkId> {
        let id = self.add_link_raw(members, mode)?;
        self.refresh_cache();
        Ok(id)
    }

    /// Group the keyframes at the given frames into a new link
    pub fn add_link_at_frames(
        &mut self,
        frames: &[Frame],
        mode: InterpolationMode,
    ) -> Result<LinkId> {
        let members = frames
            .iter()
            .map(|frame| self.id_at(*frame).ok_or(AnimationError::UnknownFrame(*frame)))
            .collect::<Result<Vec<_>>>()?;
        self.add_link(&members, mode)
    }

    /// Dissolve a link, detaching every member
    pub fn remove_link(&mut self, id: LinkId) -> bool {
        let removed = self.remove_link_raw(id);
        if removed {
            self.refresh_cache();
        }
        removed
    }

    pub fn set_link_mode(&mut self, id: LinkId, mode: InterpolationMode) -> bool {
        let Some(link) = self.links.get_mut(id) else {
            return false;
        };
        link.set_mode(mode);
        self.refresh_cache();
        true
    }

    pub fn set_relative_progress(&mut self, id: LinkId, relative: bool) -> bool {
        let Some(link) = self.links.get_mut(id) else {
            return false;
        };
        link.set_relative_progress(relative);
        self.refresh_cache();
        true
    }

    /// Dissolve every link with fewer than two members.
    ///
    /// Returns the number of links removed.
    pub fn prune_links(&mut self) -> usize {
        let pruned = self.prune_links_raw();
        if pruned > 0 {
            self.refresh_cache();
        }
        pruned
    }

    /// Link every keyframe that does not belong to a link yet.
    ///
    /// Returns `None` when fewer than two orphans exist.
    pub fn link_orphans(&mut self, mode: InterpolationMode) -> Option<LinkId> {
        let orphans: Vec<KeyframeId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.keyframes[*id].link.is_none())
            .collect();
        if orphans.len() < 2 {
            return None;
        }
        self.add_link(&orphans, mode).ok()
    }

    /// Start a batch edit. Cache recomputation is deferred until the returned
    /// guard is dropped.
    pub fn batch(&mut self) -> BatchEdit<'_> {
        BatchEdit::new(self)
    }

    // =========================================================================
    // Raw edits (no cache maintenance)
    // =========================================================================

    pub(crate) fn insert_raw(&mut self, keyframe: Keyframe) -> Result<KeyframeId> {
        let expected = self.kind();
        let found = keyframe.value.kind();
        if expected != found {
            return Err(AnimationError::KindMismatch { expected, found });
        }

        match self.search(keyframe.frame) {
            Ok(index) => {
                let id = self.order[index];
                self.keyframes[id].value = keyframe.value;
                trace!(track = %self.name, frame = keyframe.frame, "keyframe replaced");
                Ok(id)
            }
            Err(index) => {
                let id = self
                    .keyframes
                    .insert(Keyframe::new(keyframe.frame, keyframe.value));
                self.order.insert(index, id);
                trace!(track = %self.name, frame = keyframe.frame, "keyframe inserted");
                Ok(id)
            }
        }
    }

    pub(crate) fn remove_at_raw(&mut self, index: usize) -> Option<Keyframe> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);

        if let Some(link_id) = self.keyframes[id].link {
            if let Some(link) = self.links.get_mut(link_id) {
                link.remove(id, &mut self.keyframes);
            }
        }

        let removed = self.keyframes.remove(id);
        if let Some(kf) = &removed {
            trace!(track = %self.name, frame = kf.frame, "keyframe removed");
        }
        removed
    }

    pub(crate) fn add_link_raw(
        &mut self,
        members: &[KeyframeId],
        mode: InterpolationMode,
    ) -> Result<LinkId> {
        let mut unique: SmallVec<[KeyframeId; 8]> = SmallVec::new();
        for id in members {
            if !self.keyframes.contains_key(*id) {
                return Err(AnimationError::UnknownKeyframe);
            }
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        if unique.len() < 2 {
            return Err(AnimationError::TooFewMembers(unique.len()));
        }

        let mut previous: SmallVec<[LinkId; 4]> = SmallVec::new();
        for id in &unique {
            if let Some(prev) = self.keyframes[*id].link {
                if let Some(link) = self.links.get_mut(prev) {
                    link.remove(*id, &mut self.keyframes);
                }
                if !previous.contains(&prev) {
                    previous.push(prev);
                }
            }
        }

        let link_id = self
            .links
            .insert_with_key(|id| KeyframeLink::new(id, mode));
        let link = &mut self.links[link_id];
        for id in &unique {
            link.add(*id, &mut self.keyframes, true);
        }
        link.recompute_borders(&self.keyframes);

        for prev in previous {
            if self.links.get(prev).is_some_and(|link| !link.is_valid()) {
                self.remove_link_raw(prev);
            }
        }

        debug!(track = %self.name, members = unique.len(), %mode, "link added");
        Ok(link_id)
    }

    pub(crate) fn remove_link_raw(&mut self, id: LinkId) -> bool {
        match self.links.remove(id) {
            Some(mut link) => {
                link.clear(&mut self.keyframes);
                debug!(track = %self.name, "link removed");
                true
            }
            None => false,
        }
    }

    pub(crate) fn prune_links_raw(&mut self) -> usize {
        let invalid: Vec<LinkId> = self
            .links
            .iter()
            .filter(|(_, link)| !link.is_valid())
            .map(|(id, _)| id)
            .collect();
        for id in &invalid {
            self.remove_link_raw(*id);
        }
        if !invalid.is_empty() {
            debug!(track = %self.name, pruned = invalid.len(), "dangling links dissolved");
        }
        invalid.len()
    }

    /// Rewrite every keyframe's frame through `map`.
    ///
    /// When several keyframes land on the same frame, the one that came last
    /// in the previous order survives.
    pub(crate) fn retime_raw(&mut self, mut map: impl FnMut(Frame) -> Frame) {
        let mut entries: Vec<(Frame, KeyframeId)> = self
            .order
            .iter()
            .map(|id| (map(self.keyframes[*id].frame), *id))
            .collect();
        entries.sort_by_key(|(frame, _)| *frame);

        let mut order: Vec<KeyframeId> = Vec::with_capacity(entries.len());
        let mut dropped: Vec<KeyframeId> = Vec::new();
        for (frame, id) in entries {
            self.keyframes[id].frame = frame;
            if let Some(&prev) = order.last() {
                if self.keyframes[prev].frame == frame {
                    dropped.push(prev);
                    order.pop();
                }
            }
            order.push(id);
        }
        self.order = order;

        for id in dropped {
            if let Some(link_id) = self.keyframes[id].link {
                if let Some(link) = self.links.get_mut(link_id) {
                    link.remove(id, &mut self.keyframes);
                }
            }
            self.keyframes.remove(id);
        }

        for link in self.links.values_mut() {
            link.recompute_borders(&self.keyframes);
        }
    }
}

/// Map eased progress onto the spline parameter through the members' frame
/// spacing, so uneven gaps between control points still move evenly in time
fn relative_spline_position(frames: &[Frame], eased: f32) -> f32 {
    let (Some(&first), Some(&last)) = (frames.first(), frames.last()) else {
        return 0.0;
    };
    if frames.len() < 2 {
        return 0.0;
    }

    let target = first as f64 + eased as f64 * (last as f64 - first as f64);
    let last_segment = frames.len() - 2;
    let segment = frames
        .windows(2)
        .position(|pair| target < pair[1] as f64)
        .unwrap_or(last_segment)
        .min(last_segment);

    let start = frames[segment] as f64;
    let end = frames[segment + 1] as f64;
    let local = if end > start {
        (target - start) / (end - start)
    } else {
        0.0
    };
    segment as f32 + local as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitframe_core::Vec2;

    fn float_track(frames: &[(Frame, f32)]) -> KeyframeableValue {
        let mut track = KeyframeableValue::new(EntityId::default(), "x", Value::Float(0.0));
        for (frame, value) in frames {
            track
                .set_value_at_frame(*frame, Value::Float(*value))
                .unwrap();
        }
        track
    }

    fn float(track: &KeyframeableValue, frame: Frame) -> f32 {
        track.sample(frame).value.as_float().unwrap()
    }

    fn frames(track: &KeyframeableValue) -> Vec<Frame> {
        track.keyframes().map(|kf| kf.frame).collect()
    }

    #[test]
    fn test_empty_track_returns_default() {
        let mut track = KeyframeableValue::new(EntityId::default(), "x", Value::Float(3.0));
        let result = track.interpolate(10);
        assert_eq!(result.value, Value::Float(3.0));
        assert!(!result.found);
    }

    #[test]
    fn test_insert_keeps_order_and_replaces_duplicates() {
        let mut track = float_track(&[(10, 1.0), (0, 0.0), (5, 0.5), (10, 2.0)]);
        assert_eq!(frames(&track), vec![0, 5, 10]);
        assert_eq!(track.keyframe_at(10).unwrap().value, Value::Float(2.0));

        track.remove_at(1);
        track.set_value_at_frame(3, Value::Float(0.3)).unwrap();
        assert_eq!(frames(&track), vec![0, 3, 10]);
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let mut track = float_track(&[]);
        let err = track.set_value_at_frame(0, Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            AnimationError::KindMismatch {
                expected: ValueKind::Float,
                found: ValueKind::Int
            }
        );
        assert!(track.is_empty());
    }

    #[test]
    fn test_unlinked_keyframes_hold() {
        let track = float_track(&[(10, 1.0), (20, 2.0)]);
        assert_eq!(float(&track, 0), 1.0);
        assert_eq!(float(&track, 15), 1.0);
        assert_eq!(float(&track, 25), 2.0);
    }

    #[test]
    fn test_linear_link_midpoint() {
        let mut track = float_track(&[(10, 0.0), (20, 10.0)]);
        track
            .add_link_at_frames(&[10, 20], InterpolationMode::Linear)
            .unwrap();
        assert_eq!(track.interpolate(15).value, Value::Float(5.0));
    }

    #[test]
    fn test_quadratic_link() {
        let mut track = float_track(&[(0, 0.0), (10, 100.0)]);
        track
            .add_link_at_frames(&[0, 10], InterpolationMode::EaseInQuad)
            .unwrap();
        assert_eq!(track.interpolate(5).value, Value::Float(25.0));
    }

    #[test]
    fn test_exact_frames_bypass_easing() {
        let mut track = float_track(&[(0, 1.0), (7, 3.0), (20, -4.0)]);
        track
            .add_link_at_frames(&[0, 7, 20], InterpolationMode::EaseInOutElastic)
            .unwrap();
        let expected: Vec<(Frame, Value)> = track.keyframes().map(|k| (k.frame, k.value)).collect();
        for (frame, value) in expected {
            assert_eq!(track.interpolate(frame).value, value);
        }
    }

    #[test]
    fn test_outside_link_clamps_to_borders() {
        let mut track = float_track(&[(10, 1.0), (20, 2.0), (30, 9.0)]);
        track
            .add_link_at_frames(&[10, 20], InterpolationMode::Linear)
            .unwrap();
        assert_eq!(float(&track, 5), 1.0);
        assert_eq!(float(&track, 25), 2.0);
        assert_eq!(float(&track, 40), 9.0);
    }

    #[test]
    fn test_spline_passes_through_members() {
        let mut track = float_track(&[(0, 0.0), (10, 10.0), (20, 0.0)]);
        track
            .add_link_at_frames(&[0, 10, 20], InterpolationMode::Linear)
            .unwrap();
        let peak = float(&track, 10);
        assert_eq!(peak, 10.0);
        let near = float(&track, 9);
        assert!(near > 8.0 && near < 10.5, "{near}");
    }

    #[test]
    fn test_relative_progress_follows_frame_spacing() {
        // Member at frame 2 of a 0..20 span: uniform indexing places it at the
        // middle of the span, relative indexing at frame 2.
        let mut track = float_track(&[(0, 0.0), (2, 10.0), (20, 20.0)]);
        let link = track
            .add_link_at_frames(&[0, 2, 20], InterpolationMode::Linear)
            .unwrap();

        let uniform = float(&track, 11);
        track.set_relative_progress(link, true);
        let relative = float(&track, 11);

        // Segment 2..20 with control points (0, 10, 20, 20) evaluates to
        // 0.5 * (20 + 20u + 10u^2 - 10u^3) at local parameter u.
        // Uniform: t = 0.55 * 2 = 1.1, so u = 0.1
        assert!((uniform - 11.045).abs() < 1e-3, "{uniform}");
        // Relative: frame 11 is halfway through 2..20, so t = 1.5 and u = 0.5
        assert!((relative - 15.625).abs() < 1e-3, "{relative}");
    }

    #[test]
    fn test_link_spanning_the_whole_frame_range() {
        let mut track = float_track(&[(-2_000_000_000, 0.0), (2_000_000_000, 100.0)]);
        track
            .add_link_at_frames(&[-2_000_000_000, 2_000_000_000], InterpolationMode::Linear)
            .unwrap();
        assert_eq!(float(&track, 0), 50.0);
        assert_eq!(float(&track, i32::MIN), 0.0);
        assert_eq!(float(&track, i32::MAX), 100.0);

        let mut spline = float_track(&[(i32::MIN, 0.0), (0, 10.0), (i32::MAX, 20.0)]);
        let link = spline
            .add_link_at_frames(&[i32::MIN, 0, i32::MAX], InterpolationMode::Linear)
            .unwrap();
        spline.set_relative_progress(link, true);
        let mid = float(&spline, -1_000_000_000);
        assert!(mid > 0.0 && mid < 10.0, "{mid}");
    }

    #[test]
    fn test_vec2_and_int_tracks() {
        let mut pos = KeyframeableValue::new(EntityId::default(), "position", Value::Vec2(Vec2::ZERO));
        pos.set_value_at_frame(0, Value::Vec2(Vec2::new(0.0, 0.0))).unwrap();
        pos.set_value_at_frame(4, Value::Vec2(Vec2::new(8.0, -4.0))).unwrap();
        pos.add_link_at_frames(&[0, 4], InterpolationMode::Linear).unwrap();
        assert_eq!(pos.sample(1).value, Value::Vec2(Vec2::new(2.0, -1.0)));

        let mut idx = KeyframeableValue::new(EntityId::default(), "frame_index", Value::Int(0));
        idx.set_value_at_frame(0, Value::Int(0)).unwrap();
        idx.set_value_at_frame(10, Value::Int(5)).unwrap();
        idx.add_link_at_frames(&[0, 10], InterpolationMode::Linear).unwrap();
        assert_eq!(idx.sample(3).value, Value::Int(2));
    }

    #[test]
    fn test_single_member_link_behaves_like_no_link() {
        let mut linked = float_track(&[(0, 0.0), (10, 10.0), (20, 50.0)]);
        linked
            .add_link_at_frames(&[0, 10], InterpolationMode::Linear)
            .unwrap();
        linked.remove_at(0);
        assert_eq!(linked.link_count(), 1);
        assert!(!linked.links().next().unwrap().is_valid());

        let plain = float_track(&[(10, 10.0), (20, 50.0)]);
        for frame in [-5, 0, 5, 10, 15, 20, 25] {
            assert_eq!(linked.sample(frame), plain.sample(frame), "frame {frame}");
        }

        assert_eq!(linked.prune_links(), 1);
        assert_eq!(linked.link_count(), 0);
        assert!(!linked.keyframe_at(10).unwrap().is_linked());
    }

    #[test]
    fn test_remove_keyframe_at_frame_sweeps_links() {
        let mut track = float_track(&[(0, 0.0), (10, 10.0)]);
        track
            .add_link_at_frames(&[0, 10], InterpolationMode::Linear)
            .unwrap();
        assert!(track.remove_keyframe_at_frame(10));
        assert!(!track.remove_keyframe_at_frame(10));
        assert_eq!(track.link_count(), 0);
    }

    #[test]
    fn test_link_membership_is_exclusive() {
        let mut track = float_track(&[(0, 0.0), (10, 1.0), (20, 2.0), (30, 3.0)]);
        let a = track
            .add_link_at_frames(&[0, 10, 20], InterpolationMode::Linear)
            .unwrap();
        let b = track
            .add_link_at_frames(&[20, 30], InterpolationMode::EaseInQuad)
            .unwrap();

        assert_eq!(track.member_frames(a), Some(vec![0, 10]));
        assert_eq!(track.member_frames(b), Some(vec![20, 30]));
        assert_eq!(track.link_at(20).map(|l| l.id()), Some(b));

        // Stealing one of the two remaining members dissolves the old link
        track
            .add_link_at_frames(&[10, 30], InterpolationMode::Linear)
            .unwrap();
        assert!(track.link(a).is_none());
        assert!(!track.keyframe_at(0).unwrap().is_linked());
    }

    #[test]
    fn test_add_link_validation() {
        let mut track = float_track(&[(0, 0.0), (10, 1.0)]);
        let id = track.id_at(0).unwrap();
        assert_eq!(
            track.add_link(&[id, id], InterpolationMode::Linear),
            Err(AnimationError::TooFewMembers(1))
        );
        assert_eq!(
            track.add_link_at_frames(&[0, 5], InterpolationMode::Linear),
            Err(AnimationError::UnknownFrame(5))
        );
    }

    #[test]
    fn test_cache_is_recomputed_after_every_edit() {
        let mut track = float_track(&[(0, 0.0), (10, 10.0)]);
        track.cache_value(5);
        assert_eq!(track.cached_value(), Value::Float(0.0));

        let link = track
            .add_link_at_frames(&[0, 10], InterpolationMode::Linear)
            .unwrap();
        assert_eq!(track.cached_value(), track.sample(5).value);
        assert_eq!(track.cached_value(), Value::Float(5.0));

        track.set_value_at_frame(10, Value::Float(20.0)).unwrap();
        assert_eq!(track.cached_value(), Value::Float(10.0));

        track.set_link_mode(link, InterpolationMode::EaseInQuad);
        assert_eq!(track.cached_value(), Value::Float(5.0));

        track.remove_link(link);
        assert_eq!(track.cached_value(), Value::Float(0.0));

        track.remove_at(0);
        assert_eq!(track.cached_value(), Value::Float(20.0));
        assert_eq!(track.cached_frame(), 5);
    }

    #[test]
    fn test_interpolate_fills_cache() {
        let mut track = float_track(&[(0, 0.0), (10, 10.0)]);
        track
            .add_link_at_frames(&[0, 10], InterpolationMode::Linear)
            .unwrap();
        let first = track.interpolate(4);
        assert_eq!(track.cached_frame(), 4);
        assert_eq!(track.interpolate(4), first);
    }

    #[test]
    fn test_navigation_queries() {
        let track = float_track(&[(0, 0.0), (10, 1.0), (20, 2.0)]);
        assert_eq!(track.previous_frame(10), Some(0));
        assert_eq!(track.previous_frame(15), Some(10));
        assert_eq!(track.previous_frame(0), None);
        assert_eq!(track.next_frame(10), Some(20));
        assert_eq!(track.next_frame(-3), Some(0));
        assert_eq!(track.next_frame(20), None);
        assert_eq!(track.ids_in_range(5..=20).len(), 2);
    }

    #[test]
    fn test_move_keyframe_keeps_link() {
        let mut track = float_track(&[(0, 0.0), (10, 10.0), (30, 99.0)]);
        let link = track
            .add_link_at_frames(&[0, 10], InterpolationMode::Linear)
            .unwrap();

        track.move_keyframe(10, 20).unwrap();
        assert_eq!(frames(&track), vec![0, 20, 30]);
        assert_eq!(track.member_frames(link), Some(vec![0, 20]));
        assert_eq!(float(&track, 10), 5.0);

        track.move_keyframe(20, 30).unwrap();
        assert_eq!(frames(&track), vec![0, 30]);
        assert_eq!(track.keyframe_at(30).unwrap().value, Value::Float(10.0));
        assert_eq!(
            track.move_keyframe(7, 8),
            Err(AnimationError::UnknownFrame(7))
        );
    }

    #[test]
    fn test_link_orphans() {
        let mut track = float_track(&[(0, 0.0), (10, 1.0), (20, 2.0), (30, 3.0)]);
        track
            .add_link_at_frames(&[0, 10], InterpolationMode::Linear)
            .unwrap();
        let orphans = track.link_orphans(InterpolationMode::SmoothStep).unwrap();
        assert_eq!(track.member_frames(orphans), Some(vec![20, 30]));
        assert!(track.link_orphans(InterpolationMode::Linear).is_none());
    }

    #[test]
    fn test_relative_spline_position() {
        assert_eq!(relative_spline_position(&[0, 10, 20], 0.25), 0.5);
        assert_eq!(relative_spline_position(&[0, 2, 20], 0.1), 1.0);
        assert_eq!(relative_spline_position(&[0, 2, 20], 0.55), 1.5);
    }
}
