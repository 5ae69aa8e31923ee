//! Interpolation links
//!
//! A link groups two or more keyframes of one track under one
//! [`InterpolationMode`]. Frames between the link's first and last member
//! are interpolated; everything else holds the nearest keyframe.
//!
//! Links store keyframe ids into the owning track's arena. The back-reference
//! on each [`Keyframe`] is kept in step by [`KeyframeLink::add`] and
//! [`KeyframeLink::remove`], so a keyframe never points at two links.

use crate::easing::InterpolationMode;
use crate::keyframe::{Keyframe, KeyframeId};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a link within its track
    pub struct LinkId;
}

/// A group of keyframes sharing one interpolation mode
#[derive(Clone, Debug)]
pub struct KeyframeLink {
    id: LinkId,
    /// Members sorted ascending by frame once borders are computed
    members: SmallVec<[KeyframeId; 4]>,
    mode: InterpolationMode,
    /// Remap progress through the members' actual frame spacing before
    /// indexing into the spline
    relative_progress: bool,
    first: Option<KeyframeId>,
    last: Option<KeyframeId>,
}

impl KeyframeLink {
    pub(crate) fn new(id: LinkId, mode: InterpolationMode) -> Self {
        Self {
            id,
            members: SmallVec::new(),
            mode,
            relative_progress: false,
            first: None,
            last: None,
        }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: InterpolationMode) {
        self.mode = mode;
    }

    /// Whether multi-point links remap progress by frame spacing
    pub fn relative_progress(&self) -> bool {
        self.relative_progress
    }

    pub(crate) fn set_relative_progress(&mut self, relative: bool) {
        self.relative_progress = relative;
    }

    /// Member keyframes, ascending by frame
    pub fn members(&self) -> &[KeyframeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, keyframe: KeyframeId) -> bool {
        self.members.contains(&keyframe)
    }

    /// A link with fewer than two members interpolates nothing
    pub fn is_valid(&self) -> bool {
        self.members.len() >= 2
    }

    /// Member with the lowest frame
    pub fn first(&self) -> Option<KeyframeId> {
        self.first
    }

    /// Member with the highest frame
    pub fn last(&self) -> Option<KeyframeId> {
        self.last
    }

    /// Attach a keyframe to this link.
    ///
    /// Sets the keyframe's back-reference and, unless `defer_borders` is set,
    /// recomputes first/last. Returns false if the keyframe is not in the
    /// arena or already a member. The caller detaches the keyframe from any
    /// previous link first.
    pub(crate) fn add(
        &mut self,
        keyframe: KeyframeId,
        arena: &mut SlotMap<KeyframeId, Keyframe>,
        defer_borders: bool,
    ) -> bool {
        if self.members.contains(&keyframe) {
            return false;
        }
        let Some(kf) = arena.get_mut(keyframe) else {
            return false;
        };
        kf.link = Some(self.id);
        self.members.push(keyframe);

        if !defer_borders {
            self.recompute_borders(arena);
        }
        true
    }

    /// Detach a keyframe from this link and recompute borders.
    ///
    /// Removing the last member clears both borders. The link is not
    /// dissolved here even when it drops below two members.
    pub(crate) fn remove(
        &mut self,
        keyframe: KeyframeId,
        arena: &mut SlotMap<KeyframeId, Keyframe>,
    ) -> bool {
        let Some(pos) = self.members.iter().position(|id| *id == keyframe) else {
            return false;
        };
        self.members.remove(pos);

        if let Some(kf) = arena.get_mut(keyframe) {
            if kf.link == Some(self.id) {
                kf.link = None;
            }
        }

        self.recompute_borders(arena);
        true
    }

    /// Sort members by frame and refresh the first/last cache.
    ///
    /// Members no longer present in the arena are dropped. Running this twice
    /// without an intervening mutation changes nothing.
    pub(crate) fn recompute_borders(&mut self, arena: &SlotMap<KeyframeId, Keyframe>) {
        self.members.retain(|id| arena.contains_key(*id));
        self.members.sort_by_key(|id| arena[*id].frame);
        self.members.dedup();

        self.first = self.members.first().copied();
        self.last = self.members.last().copied();
    }

    /// Detach every member, leaving an empty link
    pub(crate) fn clear(&mut self, arena: &mut SlotMap<KeyframeId, Keyframe>) {
        for id in self.members.drain(..) {
            if let Some(kf) = arena.get_mut(id) {
                if kf.link == Some(self.id) {
                    kf.link = None;
                }
            }
        }
        self.first = None;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitframe_core::Value;

    fn arena_with(frames: &[i32]) -> (SlotMap<KeyframeId, Keyframe>, Vec<KeyframeId>) {
        let mut arena = SlotMap::with_key();
        let ids = frames
            .iter()
            .map(|f| arena.insert(Keyframe::new(*f, Value::Float(*f as f32))))
            .collect();
        (arena, ids)
    }

    fn new_link() -> KeyframeLink {
        let mut links: SlotMap<LinkId, ()> = SlotMap::with_key();
        KeyframeLink::new(links.insert(()), InterpolationMode::Linear)
    }

    #[test]
    fn test_add_sets_back_reference_and_borders() {
        let (mut arena, ids) = arena_with(&[20, 5, 10]);
        let mut link = new_link();

        for id in &ids {
            assert!(link.add(*id, &mut arena, false));
        }

        assert_eq!(link.len(), 3);
        assert_eq!(link.first(), Some(ids[1]));
        assert_eq!(link.last(), Some(ids[0]));
        assert!(ids.iter().all(|id| arena[*id].link() == Some(link.id())));
        assert!(!link.add(ids[0], &mut arena, false));
    }

    #[test]
    fn test_deferred_borders() {
        let (mut arena, ids) = arena_with(&[3, 1]);
        let mut link = new_link();

        link.add(ids[0], &mut arena, true);
        link.add(ids[1], &mut arena, true);
        assert_eq!(link.first(), None);

        link.recompute_borders(&arena);
        assert_eq!(link.first(), Some(ids[1]));
        assert_eq!(link.last(), Some(ids[0]));
    }

    #[test]
    fn test_recompute_borders_is_idempotent() {
        let (mut arena, ids) = arena_with(&[7, 2, 9, 4]);
        let mut link = new_link();
        for id in &ids {
            link.add(*id, &mut arena, true);
        }

        link.recompute_borders(&arena);
        let once = (link.first(), link.last(), link.members().to_vec());
        link.recompute_borders(&arena);
        let twice = (link.first(), link.last(), link.members().to_vec());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_clears_borders_when_empty() {
        let (mut arena, ids) = arena_with(&[1, 2]);
        let mut link = new_link();
        link.add(ids[0], &mut arena, false);
        link.add(ids[1], &mut arena, false);

        assert!(link.remove(ids[0], &mut arena));
        assert_eq!(arena[ids[0]].link(), None);
        assert!(!link.is_valid());
        assert_eq!(link.first(), Some(ids[1]));
        assert_eq!(link.last(), Some(ids[1]));

        assert!(link.remove(ids[1], &mut arena));
        assert!(link.is_empty());
        assert_eq!(link.first(), None);
        assert_eq!(link.last(), None);
        assert!(!link.remove(ids[1], &mut arena));
    }
}
