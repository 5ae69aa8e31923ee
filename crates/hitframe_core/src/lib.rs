//! hitframe Core Types
//!
//! Foundational primitives shared by the animation engine and the project
//! model:
//!
//! - **Frames**: discrete integer animation time
//! - **Entity ids**: stable keys for sprite and hitbox objects
//! - **Values**: the closed set of animatable property types, with the
//!   blend and spline primitives the interpolator is built on
//!
//! # Example
//!
//! ```rust
//! use hitframe_core::{Value, Vec2};
//!
//! let a = Value::Vec2(Vec2::new(0.0, 0.0));
//! let b = Value::Vec2(Vec2::new(10.0, 20.0));
//! assert_eq!(a.lerp(&b, 0.5), Value::Vec2(Vec2::new(5.0, 10.0)));
//! ```

pub mod value;
pub mod vec2;

pub use value::{Value, ValueKind};
pub use vec2::Vec2;

use slotmap::new_key_type;

/// A discrete unit of animation time
pub type Frame = i32;

new_key_type! {
    /// Unique identifier for an animation object (sprite or hitbox)
    pub struct EntityId;
}
