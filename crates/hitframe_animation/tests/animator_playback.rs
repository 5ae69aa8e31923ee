//! Integration tests for playback across several tracks
//!
//! These tests verify that:
//! - Playback steps through frames at the configured rate and wraps in bounds
//! - Every track's cache follows the animator's frame
//! - Keyframe navigation considers all tracks of the scene

use hitframe_animation::{Animator, InterpolationMode, KeyframeableValue, PlaybackState};
use hitframe_core::{EntityId, Frame, Value, Vec2};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn scene() -> Vec<KeyframeableValue> {
    let mut position = KeyframeableValue::new(EntityId::default(), "position", Value::Vec2(Vec2::ZERO));
    position.set_value_at_frame(0, Value::Vec2(Vec2::ZERO)).unwrap();
    position
        .set_value_at_frame(4, Value::Vec2(Vec2::new(8.0, 4.0)))
        .unwrap();
    position
        .add_link_at_frames(&[0, 4], InterpolationMode::Linear)
        .unwrap();

    let mut frame_index = KeyframeableValue::new(EntityId::default(), "frame_index", Value::Int(0));
    frame_index.set_value_at_frame(1, Value::Int(0)).unwrap();
    frame_index.set_value_at_frame(6, Value::Int(5)).unwrap();
    frame_index
        .add_link_at_frames(&[1, 6], InterpolationMode::Linear)
        .unwrap();

    vec![position, frame_index]
}

#[test]
fn test_playback_updates_every_track_cache() {
    let mut scene = scene();
    let mut animator = Animator::with_fps(4);
    animator.play_forward();

    // Half a second at 4 fps is two frames
    assert!(animator.update(0.5, &mut scene));
    assert_eq!(animator.current_frame(), 2);
    assert_eq!(scene[0].cached_value(), Value::Vec2(Vec2::new(4.0, 2.0)));
    assert_eq!(scene[1].cached_value(), Value::Int(1));
    assert_eq!(scene[1].cached_frame(), 2);
}

#[test]
fn test_forward_playback_wraps_to_first_keyframe() {
    let mut scene = scene();
    let mut animator = Animator::with_fps(4);
    animator.set_frame(6, &mut scene);
    animator.play_forward();

    animator.update(0.25, &mut scene);
    assert_eq!(animator.current_frame(), 0);
    assert_eq!(scene[0].cached_value(), Value::Vec2(Vec2::ZERO));
}

#[test]
fn test_backward_playback_wraps_to_last_keyframe() {
    let mut scene = scene();
    let mut animator = Animator::with_fps(4);
    animator.play_backward();
    assert_eq!(animator.state(), PlaybackState::PlayingBackward);

    animator.update(0.25, &mut scene);
    assert_eq!(animator.current_frame(), 6);
    assert_eq!(scene[1].cached_value(), Value::Int(5));
}

#[test]
fn test_non_looping_playback_runs_past_bounds() {
    let mut scene = scene();
    let mut animator = Animator::with_fps(4);
    animator.set_looping(false);
    animator.set_frame(6, &mut scene);
    animator.play_forward();

    animator.update(0.5, &mut scene);
    assert_eq!(animator.current_frame(), 8);
    // Past the last keyframe every track holds its last value
    assert_eq!(scene[1].cached_value(), Value::Int(5));
}

#[test]
fn test_navigation_spans_all_tracks() {
    let mut scene = scene();
    let mut animator = Animator::new();

    let visited: Rc<RefCell<Vec<Frame>>> = Rc::default();
    let sink = visited.clone();
    animator.on_frame_changed(move |frame| sink.borrow_mut().push(frame));

    assert_eq!(animator.jump_to_next(&mut scene), 1);
    assert_eq!(animator.jump_to_next(&mut scene), 4);
    assert_eq!(animator.jump_to_next(&mut scene), 6);
    // Clamped at the end of the timeline
    assert_eq!(animator.jump_to_next(&mut scene), 6);
    assert_eq!(animator.jump_to_previous(&mut scene), 4);

    assert_eq!(*visited.borrow(), vec![1, 4, 6, 6, 4]);
}
