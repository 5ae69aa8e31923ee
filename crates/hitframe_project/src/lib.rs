//! hitframe projects
//!
//! Animation objects and the files they are stored in.
//!
//! # Features
//!
//! - **Objects**: sprites and hitboxes as named sets of keyframeable properties
//! - **Registry**: a [`Project`] holding every object, queryable by name and
//!   drivable by the [`Animator`](hitframe_animation::Animator)
//! - **Documents**: JSON project files with link membership rebuilt on load
//!
//! # Example
//!
//! ```rust
//! use hitframe_animation::{Animator, InterpolationMode};
//! use hitframe_core::Value;
//! use hitframe_project::Project;
//!
//! let mut project = Project::new("idle");
//! project.add_sprite("hero", None).unwrap();
//!
//! let rotation = project.track_mut("hero", "rotation").unwrap();
//! rotation.set_value_at_frame(20, Value::Float(30.0)).unwrap();
//! rotation.add_link_at_frames(&[0, 20], InterpolationMode::Linear).unwrap();
//!
//! let mut animator = Animator::new();
//! animator.set_frame(10, &mut project);
//! let rotation = project.track("hero", "rotation").unwrap();
//! assert_eq!(rotation.cached_value(), Value::Float(15.0));
//! ```

pub mod document;
pub mod error;
pub mod object;
pub mod project;

pub use document::{LinkData, ObjectData, ProjectDocument, TrackData, FORMAT_VERSION};
pub use error::{ProjectError, Result};
pub use object::{AnimationObject, HitboxObject, ObjectKind, PropertySet, SpriteObject};
pub use project::Project;
