//! Project files
//!
//! The persisted form of a project. Keyframes are stored per track as
//! `(frame, value)` pairs and links by the frames of their members; the
//! in-memory keyframe and link ids are rebuilt on load by matching frames.
//!
//! ```json
//! {
//!   "version": 1,
//!   "name": "slash",
//!   "fps": 60,
//!   "objects": [
//!     {
//!       "name": "blade",
//!       "kind": "hitbox",
//!       "tracks": [
//!         {
//!           "property": "position",
//!           "default": { "vec2": { "x": 0.0, "y": 0.0 } },
//!           "keyframes": [[0, { "vec2": { "x": 0.0, "y": 0.0 } }]],
//!           "links": []
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::error::{ProjectError, Result};
use crate::object::{AnimationObject, ObjectKind};
use crate::project::Project;
use hitframe_animation::{AnimationError, InterpolationMode, KeyframeableValue};
use hitframe_core::{EntityId, Frame, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Current document format version
pub const FORMAT_VERSION: u32 = 1;

/// Serialized project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub objects: Vec<ObjectData>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

fn default_fps() -> u32 {
    Project::DEFAULT_FPS
}

/// Serialized animation object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackData>,
}

/// Serialized property track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    pub property: String,
    pub default: Value,
    /// Keyframes in ascending frame order
    #[serde(default)]
    pub keyframes: Vec<(Frame, Value)>,
    #[serde(default)]
    pub links: Vec<LinkData>,
}

/// Serialized link
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    /// Frames of the member keyframes
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub mode: InterpolationMode,
    #[serde(default)]
    pub relative_progress: bool,
}

impl ProjectDocument {
    /// Capture the persistent state of `project`
    pub fn from_project(project: &Project) -> Self {
        let objects = project
            .objects()
            .map(|object| ObjectData {
                name: object.name().to_string(),
                kind: object.kind(),
                texture: object.as_sprite().and_then(|sprite| sprite.texture.clone()),
                tracks: object.properties().iter().map(TrackData::from_track).collect(),
            })
            .collect();

        Self {
            version: FORMAT_VERSION,
            name: project.name.clone(),
            fps: project.fps,
            objects,
        }
    }

    /// Rebuild a project.
    ///
    /// Objects get their standard property set; each stored track replaces
    /// the matching default track wholesale. A stored property the object
    /// kind does not have, a value of the wrong kind, or a link naming a
    /// frame without a keyframe is an error. Links with fewer than two
    /// distinct keyframes are dropped with a warning.
    pub fn into_project(self) -> Result<Project> {
        if self.version > FORMAT_VERSION {
            warn!(
                version = self.version,
                supported = FORMAT_VERSION,
                "project written by a newer format version"
            );
        }

        let mut project = Project::new(self.name);
        project.fps = self.fps.max(1);

        for object in self.objects {
            let id = match object.kind {
                ObjectKind::Sprite => project.add_sprite(&object.name, object.texture)?,
                ObjectKind::Hitbox => project.add_hitbox(&object.name)?,
            };
            let Some(target) = project.object_mut(id) else {
                return Err(ProjectError::UnknownObject(object.name));
            };
            for track in object.tracks {
                restore_track(target, track)?;
            }
        }

        debug!(
            name = %project.name,
            objects = project.len(),
            keyframes = project.keyframe_count(),
            "project document loaded"
        );
        Ok(project)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Read a document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Write a pretty-printed document to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        self.write(path, true)
    }

    pub fn write(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;
        fs::write(path, json).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Project {
    /// Load and rebuild a project file
    pub fn load(path: &Path) -> Result<Self> {
        ProjectDocument::load(path)?.into_project()
    }

    /// Save the project as a pretty-printed file
    pub fn save(&self, path: &Path) -> Result<()> {
        ProjectDocument::from_project(self).save(path)
    }
}

impl TrackData {
    pub fn from_track(track: &KeyframeableValue) -> Self {
        let keyframes = track.keyframes().map(|kf| (kf.frame, kf.value)).collect();
        let links = track
            .links()
            .filter(|link| link.is_valid())
            .filter_map(|link| {
                let frames = track.member_frames(link.id())?;
                Some(LinkData {
                    frames,
                    mode: link.mode(),
                    relative_progress: link.relative_progress(),
                })
            })
            .collect();

        Self {
            property: track.name().to_string(),
            default: track.default_value(),
            keyframes,
            links,
        }
    }

    /// Build the track for `owner`
    pub fn into_track(self, owner: EntityId) -> Result<KeyframeableValue> {
        let mut track = KeyframeableValue::new(owner, self.property, self.default);
        let mut relative = Vec::new();
        {
            let mut batch = track.batch();
            for (frame, value) in self.keyframes {
                batch.set_value_at_frame(frame, value)?;
            }
            for link in self.links {
                let members = link
                    .frames
                    .iter()
                    .map(|frame| {
                        batch
                            .track()
                            .id_at(*frame)
                            .ok_or(AnimationError::UnknownFrame(*frame))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                let mut distinct = members.clone();
                distinct.sort_unstable();
                distinct.dedup();
                if distinct.len() < 2 {
                    warn!(
                        track = %batch.track().name(),
                        frames = ?link.frames,
                        "skipping link with fewer than 2 keyframes"
                    );
                    continue;
                }

                let id = batch.add_link(&members, link.mode)?;
                if link.relative_progress {
                    relative.push(id);
                }
            }
        }
        for id in relative {
            track.set_relative_progress(id, true);
        }
        Ok(track)
    }
}

fn restore_track(object: &mut AnimationObject, data: TrackData) -> Result<()> {
    let object_name = object.name().to_string();
    let Some(existing) = object.properties().get(&data.property) else {
        return Err(ProjectError::UnknownProperty {
            object: object_name,
            property: data.property,
        });
    };

    let expected = existing.kind();
    let found = data.default.kind();
    if expected != found {
        return Err(AnimationError::KindMismatch { expected, found }.into());
    }

    let track = data.into_track(object.id())?;
    object.properties_mut().insert(track);
    Ok(())
}
