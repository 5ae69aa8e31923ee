//! Starter project written by `hitframe new`

use hitframe_animation::InterpolationMode;
use hitframe_core::{Value, Vec2};
use hitframe_project::{Project, Result};

/// A punching sprite with a fist hitbox that follows the swing
pub fn sample_project(name: &str) -> Result<Project> {
    let mut project = Project::new(name);
    project.add_sprite("fighter", Some("fighter.png".to_string()))?;
    project.add_hitbox("fist")?;

    let frame_index = project.track_mut("fighter", "frame_index")?;
    frame_index.set_value_at_frame(20, Value::Int(7))?;
    frame_index.add_link_at_frames(&[0, 20], InterpolationMode::Linear)?;

    let position = project.track_mut("fighter", "position")?;
    position.set_value_at_frame(10, Value::Vec2(Vec2::new(24.0, -8.0)))?;
    position.set_value_at_frame(20, Value::Vec2(Vec2::ZERO))?;
    position.add_link_at_frames(&[0, 10, 20], InterpolationMode::EaseInOutQuad)?;

    let fist = project.track_mut("fist", "position")?;
    fist.set_value_at_frame(6, Value::Vec2(Vec2::new(10.0, -4.0)))?;
    fist.set_value_at_frame(10, Value::Vec2(Vec2::new(38.0, -12.0)))?;
    fist.add_link_at_frames(&[6, 10], InterpolationMode::EaseOutCubic)?;

    let size = project.track_mut("fist", "size")?;
    size.set_value_at_frame(6, Value::Vec2(Vec2::new(12.0, 12.0)))?;
    size.set_value_at_frame(14, Value::Vec2(Vec2::ONE))?;
    size.add_link_at_frames(&[6, 14], InterpolationMode::EaseInBack)?;

    Ok(project)
}
