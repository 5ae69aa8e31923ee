//! Animation objects
//!
//! Sprites and hitboxes are containers of named keyframeable properties.
//! Every property starts with a keyframe at frame 0 holding its default, so
//! a fresh object evaluates to its defaults at every frame.

use hitframe_animation::{Animated, KeyframeableValue};
use hitframe_core::{EntityId, Value, Vec2};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named tracks of one object, in declaration order
#[derive(Clone, Debug, Default)]
pub struct PropertySet {
    tracks: Vec<KeyframeableValue>,
    index: FxHashMap<String, usize>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track, replacing any track with the same name.
    ///
    /// Returns the replaced track.
    pub fn insert(&mut self, track: KeyframeableValue) -> Option<KeyframeableValue> {
        match self.index.get(track.name()) {
            Some(&slot) => Some(std::mem::replace(&mut self.tracks[slot], track)),
            None => {
                self.index.insert(track.name().to_string(), self.tracks.len());
                self.tracks.push(track);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&KeyframeableValue> {
        self.index.get(name).map(|&slot| &self.tracks[slot])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut KeyframeableValue> {
        self.index.get(name).map(|&slot| &mut self.tracks[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyframeableValue> + '_ {
        self.tracks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut KeyframeableValue> + '_ {
        self.tracks.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tracks.iter().map(|track| track.name())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl Animated for PropertySet {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue)) {
        self.tracks.iter().for_each(|track| f(track));
    }

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue)) {
        self.tracks.iter_mut().for_each(|track| f(track));
    }
}

/// What an object is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Sprite,
    Hitbox,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Sprite => f.write_str("sprite"),
            ObjectKind::Hitbox => f.write_str("hitbox"),
        }
    }
}

/// A textured, transformable sprite
#[derive(Clone, Debug)]
pub struct SpriteObject {
    id: EntityId,
    pub name: String,
    /// Texture path, if one is assigned
    pub texture: Option<String>,
    properties: PropertySet,
}

impl SpriteObject {
    pub const POSITION: &'static str = "position";
    pub const SCALE: &'static str = "scale";
    pub const ROTATION: &'static str = "rotation";
    pub const TRANSPARENCY: &'static str = "transparency";
    pub const FRAME_INDEX: &'static str = "frame_index";
    pub const Z_INDEX: &'static str = "z_index";

    pub fn new(id: EntityId, name: impl Into<String>, texture: Option<String>) -> Self {
        let mut properties = PropertySet::new();
        for (property, default) in [
            (Self::POSITION, Value::Vec2(Vec2::ZERO)),
            (Self::SCALE, Value::Vec2(Vec2::ONE)),
            (Self::ROTATION, Value::Float(0.0)),
            (Self::TRANSPARENCY, Value::Float(0.0)),
            (Self::FRAME_INDEX, Value::Int(0)),
            (Self::Z_INDEX, Value::Int(0)),
        ] {
            properties.insert(KeyframeableValue::with_default_keyframe(id, property, default));
        }

        Self {
            id,
            name: name.into(),
            texture,
            properties,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }
}

/// A rectangular collision area
#[derive(Clone, Debug)]
pub struct HitboxObject {
    id: EntityId,
    pub name: String,
    properties: PropertySet,
}

impl HitboxObject {
    pub const POSITION: &'static str = "position";
    pub const SIZE: &'static str = "size";

    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        let mut properties = PropertySet::new();
        properties.insert(KeyframeableValue::with_default_keyframe(
            id,
            Self::POSITION,
            Value::Vec2(Vec2::ZERO),
        ));
        properties.insert(KeyframeableValue::with_default_keyframe(
            id,
            Self::SIZE,
            Value::Vec2(Vec2::ONE),
        ));

        Self {
            id,
            name: name.into(),
            properties,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }
}

/// Any object registered in a project
#[derive(Clone, Debug)]
pub enum AnimationObject {
    Sprite(SpriteObject),
    Hitbox(HitboxObject),
}

impl AnimationObject {
    pub fn id(&self) -> EntityId {
        match self {
            AnimationObject::Sprite(sprite) => sprite.id(),
            AnimationObject::Hitbox(hitbox) => hitbox.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AnimationObject::Sprite(sprite) => &sprite.name,
            AnimationObject::Hitbox(hitbox) => &hitbox.name,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            AnimationObject::Sprite(_) => ObjectKind::Sprite,
            AnimationObject::Hitbox(_) => ObjectKind::Hitbox,
        }
    }

    pub fn properties(&self) -> &PropertySet {
        match self {
            AnimationObject::Sprite(sprite) => sprite.properties(),
            AnimationObject::Hitbox(hitbox) => hitbox.properties(),
        }
    }

    pub fn properties_mut(&mut self) -> &mut PropertySet {
        match self {
            AnimationObject::Sprite(sprite) => sprite.properties_mut(),
            AnimationObject::Hitbox(hitbox) => hitbox.properties_mut(),
        }
    }

    pub fn as_sprite(&self) -> Option<&SpriteObject> {
        match self {
            AnimationObject::Sprite(sprite) => Some(sprite),
            AnimationObject::Hitbox(_) => None,
        }
    }

    pub fn as_hitbox(&self) -> Option<&HitboxObject> {
        match self {
            AnimationObject::Hitbox(hitbox) => Some(hitbox),
            AnimationObject::Sprite(_) => None,
        }
    }
}

impl Animated for AnimationObject {
    fn for_each_track(&self, f: &mut dyn FnMut(&KeyframeableValue)) {
        self.properties().for_each_track(f);
    }

    fn for_each_track_mut(&mut self, f: &mut dyn FnMut(&mut KeyframeableValue)) {
        self.properties_mut().for_each_track_mut(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitframe_core::ValueKind;

    #[test]
    fn test_sprite_defaults() {
        let sprite = SpriteObject::new(EntityId::default(), "hero", None);
        let names: Vec<&str> = sprite.properties().names().collect();
        assert_eq!(
            names,
            vec!["position", "scale", "rotation", "transparency", "frame_index", "z_index"]
        );

        let scale = sprite.properties().get(SpriteObject::SCALE).unwrap();
        assert_eq!(scale.len(), 1);
        assert_eq!(scale.sample(250).value, Value::Vec2(Vec2::ONE));
        assert_eq!(
            sprite.properties().get(SpriteObject::Z_INDEX).unwrap().kind(),
            ValueKind::Int
        );
    }

    #[test]
    fn test_property_set_replaces_by_name() {
        let mut set = PropertySet::new();
        let id = EntityId::default();
        assert!(set
            .insert(KeyframeableValue::new(id, "x", Value::Float(0.0)))
            .is_none());
        let replaced = set.insert(KeyframeableValue::new(id, "x", Value::Int(3)));
        assert_eq!(replaced.unwrap().kind(), ValueKind::Float);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("x").unwrap().kind(), ValueKind::Int);
        assert!(set.get("y").is_none());
    }

    #[test]
    fn test_hitbox_tracks_are_animated() {
        let mut hitbox = AnimationObject::Hitbox(HitboxObject::new(EntityId::default(), "hurt"));
        let mut count = 0;
        hitbox.for_each_track_mut(&mut |track| {
            track.cache_value(3);
            count += 1;
        });
        assert_eq!(count, 2);
        assert_eq!(hitbox.kind(), ObjectKind::Hitbox);
    }
}
