//! hitframe Animation Engine
//!
//! Keyframe storage, interpolation links, easing, and frame-stepped playback
//! for sprite and hitbox properties.
//!
//! # Features
//!
//! - **Tracks**: per-property keyframes kept sorted and frame-unique
//! - **Links**: groups of keyframes interpolated under one easing mode, with
//!   Catmull-Rom splines across three or more members
//! - **Easing**: power, sine, exponential, circular, back, elastic, bounce and
//!   cubic-bezier curves
//! - **Cached evaluation**: each track keeps its value at the current frame
//!   coherent across every edit
//! - **Batch edits**: bulk rewrites that defer cache work until they finish
//! - **Playback**: an animator stepping a shared frame counter at a fixed rate
//!
//! # Example
//!
//! ```rust
//! use hitframe_animation::{InterpolationMode, KeyframeableValue};
//! use hitframe_core::{EntityId, Value};
//!
//! let mut track = KeyframeableValue::new(EntityId::default(), "transparency", Value::Float(1.0));
//! track.set_value_at_frame(10, Value::Float(0.0)).unwrap();
//! track.set_value_at_frame(20, Value::Float(10.0)).unwrap();
//! track.add_link_at_frames(&[10, 20], InterpolationMode::Linear).unwrap();
//!
//! assert_eq!(track.interpolate(15).value, Value::Float(5.0));
//! ```

pub mod animator;
pub mod batch;
pub mod easing;
pub mod error;
pub mod keyframe;
pub mod link;
pub mod pending;
pub mod track;

pub use animator::{timeline_bounds, Animated, Animator, FrameListener, ListenerId, PlaybackState};
pub use batch::BatchEdit;
pub use easing::InterpolationMode;
pub use error::{AnimationError, Result};
pub use keyframe::{Keyframe, KeyframeId};
pub use link::{KeyframeLink, LinkId};
pub use pending::PendingSpan;
pub use track::{Interpolated, KeyframeableValue};
