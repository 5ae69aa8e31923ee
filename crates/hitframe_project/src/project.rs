//! Project registry
//!
//! A [`Project`] owns every animation object of a scene and is what the
//! animator queries for timeline bounds and cache refreshes.

use crate::error::{ProjectError, Result};
use crate::object::{AnimationObject, HitboxObject, SpriteObject};
use hitframe_animation::{Animated, KeyframeableValue};
use hitframe_core::{EntityId, Frame};
use slotmap::SlotMap;
use tracing::debug;

/// All objects of one animation, with the playback rate it was authored at
#[derive(Clone, Debug)]
pub struct Project {
    pub name: String,
    pub fps: u32,
    objects: SlotMap<EntityId, AnimationObject>,
}

impl Project {
    pub const DEFAULT_FPS: u32 = 60;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fps: Self::DEFAULT_FPS,
            objects: SlotMap::with_key(),
        }
    }

    pub fn add_sprite(&mut self, name: &str, texture: Option<String>) -> Result<EntityId> {
        self.ensure_unique(name)?;
        let id = self.objects.insert_with_key(|id| {
            AnimationObject::Sprite(SpriteObject::new(id, name, texture))
        });
        debug!(name, "sprite added");
        Ok(id)
    }

    pub fn add_hitbox(&mut self, name: &str) -> Result<EntityId> {
        self.ensure_unique(name)?;
        let id = self
            .objects
            .insert_with_key(|id| AnimationObject::Hitbox(HitboxObject::new(id, name)));
        debug!(name, "hitbox added");
        Ok(id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<AnimationObject> {
        self.objects.remove(id)
    }

    pub fn object(&self, id: EntityId) -> Option<&AnimationObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut AnimationObject> {
        self.objects.get_mut(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &AnimationObject> + '_ {
        self.objects.values()
    }

    pub fn sprites(&self) -> impl Iterator<Item = &SpriteObject> + '_ {
        self.objects.values().filter_map(AnimationObject::as_sprite)
    }

    pub fn hitboxes(&self) -> impl Iterator<Item = &HitboxObject> + '_ {
        self.objects.values().filter_map(AnimationObject::as_hitbox)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look an object up by name
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name() == name)
            .map(|(id, _)| id)
    }

    /// The track of `property` on the object called `object`
    pub fn track(&self, object: &str, property: &str) -> Result<&KeyframeableValue> {
        let id = self
            .find(object)
            .ok_or_else(|| ProjectError::UnknownObject(object.to_string()))?;
        self.objects[id]
            .properties()
            .get(property)
            .ok_or_else(|| unknown_property(object, property))
    }

    pub fn track_mut(&mut self, object: &str, property: &str) -> Result<&mut KeyframeableValue> {
        let id = self
            .find(object)
            .ok_or_else(|| ProjectError::UnknownObject(object.to_string()))?;
        self.objects[id]
            .properties_mut()
            .get_mut(property)
            .ok_or_else(|| unknown_property(object, property))
    }

    /// Multiply every keyframe frame of every track by `factor`.
    ///
    /// Each track is rewritten in one batch edit, so its cache is recomputed
    /// once. Keyframes that round onto the same frame merge.
    pub fn retime(&mut self, factor: f32) {
        let mut tracks = 0usize;
        self.for_each_track_mut(&mut |track| {
            track.batch().scale_time(factor);
            tracks += 1;
        });
        debug!(factor, tracks, "project retimed");
    }

    /// Total keyframe count across every track
    pub fn keyframe_count(&self) -> usize {
        let mut count = 0;
        self.for_each_track(&mut |track| count += track.len());
        count
    }

    /// First and last keyframe frame across every track
    pub fn bounds(&self) -> Option<(Frame, Frame)> {
        hitframe_animation::timeline_bounds(self)
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.find(name).is_some() {
            return Err(ProjectError::DuplicateObject(name.to_string()));
        }
        Ok(())
    }
}

fn unknown_property(object: &str, property: &str) -> ProjectError {
    ProjectError::UnknownProperty {
        object: object.to_string(),
        property: property.to_string(),
    }
}

impl Animated for Project {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue)) {
        self.objects.for_each_track(f);
    }

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue)) {
        self.objects.for_each_track_mut(f);
    }
}
